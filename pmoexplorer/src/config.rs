//! # Explorer configuration
//!
//! The configuration is built in three layers:
//!
//! 1. the embedded default document (`pmoexplorer.yaml`)
//! 2. an optional user YAML file, given explicitly or through `PMOEXPLORER_CONFIG`
//! 3. environment overrides, `PMOEXPLORER__<SECTION>__<KEY>=<value>`
//!
//! ```no_run
//! use pmoexplorer::ExplorerConfig;
//!
//! let config = ExplorerConfig::load(None)?;
//! println!("SSDP timeout: {:?}", config.discovery.timeout());
//! # Ok::<(), pmoexplorer::ExplorerError>(())
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::errors::Result;

const DEFAULT_CONFIG: &str = include_str!("pmoexplorer.yaml");

const ENV_CONFIG_FILE: &str = "PMOEXPLORER_CONFIG";
const ENV_PREFIX: &str = "PMOEXPLORER__";

const DEFAULT_TIMEOUT_MS: u64 = 2000;
const DEFAULT_BUFFER_SIZE: usize = 4096;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub timeout_ms: u64,
    pub buffer_size: usize,
    pub log_datagrams: bool,
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            log_datagrams: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub discovery: DiscoveryConfig,
    pub log: LogConfig,
}

impl ExplorerConfig {
    /// Loads the configuration from `path`, or from `PMOEXPLORER_CONFIG` when
    /// `path` is `None`, on top of the embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var(ENV_CONFIG_FILE).ok().map(PathBuf::from));

        let user = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading explorer configuration");
                Some(fs::read_to_string(&path)?)
            }
            None => None,
        };

        Self::from_layers(user.as_deref(), env::vars())
    }

    /// Builds a configuration from an optional user document and environment pairs.
    pub fn from_layers<I>(user: Option<&str>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut data: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if let Some(user) = user {
            let external = lower_keys(serde_yaml::from_str(user)?);
            merge_yaml(&mut data, &external);
        }

        for (key, value) in vars {
            let Some(path) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path: Vec<String> = path.split("__").map(str::to_lowercase).collect();
            debug!("Configuration override from {}", key);
            set_value(&mut data, &path, convert_env_value(&value));
        }

        Ok(serde_yaml::from_value(data)?)
    }
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

fn set_value(data: &mut Value, path: &[String], value: Value) {
    let Some((key, rest)) = path.split_first() else {
        *data = value;
        return;
    };
    if let Value::Mapping(map) = data {
        let key = Value::String(key.clone());
        if rest.is_empty() {
            map.insert(key, value);
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            set_value(entry, rest, value);
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| match k {
                    Value::String(s) => (Value::String(s.to_lowercase()), lower_keys(v)),
                    other => (other, lower_keys(v)),
                })
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_embedded_defaults_match_code_defaults() {
        let config = ExplorerConfig::from_layers(None, no_env()).unwrap();
        assert_eq!(config, ExplorerConfig::default());
        assert_eq!(config.discovery.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let user = "Discovery:\n  Timeout_MS: 500\n";
        let config = ExplorerConfig::from_layers(Some(user), no_env()).unwrap();
        assert_eq!(config.discovery.timeout_ms, 500);
        assert_eq!(config.discovery.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_env_overrides_win() {
        let vars = vec![
            ("PMOEXPLORER__DISCOVERY__BUFFER_SIZE".to_string(), "8192".to_string()),
            ("PMOEXPLORER__DISCOVERY__LOG_DATAGRAMS".to_string(), "true".to_string()),
            ("PMOEXPLORER__LOG__FILTER".to_string(), "pmoexplorer=debug".to_string()),
            ("UNRELATED".to_string(), "1".to_string()),
        ];
        let user = "discovery:\n  buffer_size: 1024\n";
        let config = ExplorerConfig::from_layers(Some(user), vars).unwrap();
        assert_eq!(config.discovery.buffer_size, 8192);
        assert!(config.discovery.log_datagrams);
        assert_eq!(config.log.filter, "pmoexplorer=debug");
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let user = "discovery:\n  timeout_ms: soon\n";
        assert!(ExplorerConfig::from_layers(Some(user), no_env()).is_err());
    }
}
