//! Discovered servers, keyed by their deduplicated `SERVER` string.

use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::errors::{ExplorerError, LookupKind, Result};
use crate::ssdp::{SearchResponse, SsdpClient};

/// One SSDP answer, as stored after discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRecord {
    /// Deduplicated identifier, `<server>_<n>`.
    pub id: String,
    pub server: String,
    /// Lower-cased header name to value; always holds `location`.
    pub properties: IndexMap<String, String>,
}

impl ServerRecord {
    pub fn location(&self) -> &str {
        self.properties
            .get("location")
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Servers found during one discovery window, in arrival order.
///
/// The n-th answer carrying a given server string is stored as `<server>_<n-1>`.
#[derive(Debug, Clone, Default)]
pub struct ServerRegistry {
    records: IndexMap<String, ServerRecord>,
    next_suffix: HashMap<String, usize>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `response` and returns the id it was given.
    pub fn insert(&mut self, response: SearchResponse) -> String {
        let suffix = self.next_suffix.entry(response.server.clone()).or_insert(0);
        let id = format!("{}_{}", response.server, suffix);
        *suffix += 1;

        debug!("Registering {} at {}", id, response.location());
        self.records.insert(
            id.clone(),
            ServerRecord {
                id: id.clone(),
                server: response.server,
                properties: response.headers,
            },
        );
        id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ServerRecord> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerRecord> {
        self.records.values()
    }

    /// Ids containing `name`, ignoring case, in arrival order.
    pub fn matches(&self, name: &str) -> Vec<&str> {
        let needle = name.to_lowercase();
        self.records
            .keys()
            .filter(|id| id.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// The server whose id contains `name`.
    ///
    /// With several candidates, `index` picks one when it is in range; otherwise
    /// the first is used.
    pub fn resolve(&self, name: &str, index: usize) -> Result<&ServerRecord> {
        let matches = self.matches(name);
        if matches.is_empty() {
            return Err(ExplorerError::not_found(LookupKind::Server, name));
        }

        if matches.len() > 1 {
            warn!(
                "Several servers match '{}', using index {}: {}",
                name,
                if index < matches.len() { index } else { 0 },
                matches.join(", ")
            );
        }

        let id = matches.get(index).or(matches.first()).copied().unwrap_or_default();
        self.records
            .get(id)
            .ok_or_else(|| ExplorerError::not_found(LookupKind::Server, name))
    }
}

impl FromIterator<SearchResponse> for ServerRegistry {
    fn from_iter<I: IntoIterator<Item = SearchResponse>>(iter: I) -> Self {
        let mut registry = ServerRegistry::new();
        for response in iter {
            registry.insert(response);
        }
        registry
    }
}

/// Runs one SSDP search and registers every answer.
pub fn discover(timeout: Duration, buffer_size: usize) -> Result<ServerRegistry> {
    discover_with(&SsdpClient::new(timeout, buffer_size))
}

pub fn discover_with(client: &SsdpClient) -> Result<ServerRegistry> {
    let registry: ServerRegistry = client.search()?.into_iter().collect();
    info!("Discovery found {} server record(s)", registry.len());
    Ok(registry)
}
