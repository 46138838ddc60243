use indexmap::IndexMap;
use tracing::trace;

use crate::errors::{ExplorerError, Result};

/// Server string used when an answer carries no `SERVER` header.
pub const UNKNOWN_SERVER: &str = "Unknown";

/// One answer to an `M-SEARCH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// Value of the `SERVER` header.
    pub server: String,
    /// Every other header, lower-cased name to value, in datagram order.
    pub headers: IndexMap<String, String>,
}

impl SearchResponse {
    pub fn location(&self) -> &str {
        // Checked at parse time.
        self.headers.get("location").map(String::as_str).unwrap_or_default()
    }
}

/// Parses the CRLF-separated header lines of an SSDP answer.
///
/// Fails when the datagram has no `LOCATION` header.
pub fn parse_search_response(data: &str) -> Result<SearchResponse> {
    let mut server: Option<String> = None;
    let mut headers = IndexMap::new();

    for line in data.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else {
            if !line.trim().is_empty() {
                trace!("Skipping SSDP line without colon: '{}'", line);
            }
            continue;
        };

        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();

        if name == "server" {
            server = Some(value.to_string());
        } else if !name.is_empty() && !value.is_empty() {
            headers.insert(name, value.to_string());
        } else {
            trace!("Skipping malformed SSDP header: '{}'", line);
        }
    }

    if !headers.contains_key("location") {
        return Err(ExplorerError::malformed("SSDP answer without LOCATION header"));
    }

    Ok(SearchResponse {
        server: server
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_SERVER.to_string()),
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "HTTP/1.1 200 OK\r\n\
CACHE-CONTROL: max-age=1800\r\n\
EXT:\r\n\
LOCATION: http://192.168.1.14:9197/dmr\r\n\
SERVER: Linux/4.9 UPnP/1.0 Samsung/1.0\r\n\
ST: upnp:rootdevice\r\n\
USN: uuid:1234::upnp:rootdevice\r\n\
\r\n";

    #[test]
    fn test_parse_answer() {
        let response = parse_search_response(ANSWER).unwrap();
        assert_eq!(response.server, "Linux/4.9 UPnP/1.0 Samsung/1.0");
        assert_eq!(response.location(), "http://192.168.1.14:9197/dmr");

        let names: Vec<&str> = response.headers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["cache-control", "location", "st", "usn"]);
        assert_eq!(response.headers["usn"], "uuid:1234::upnp:rootdevice");
    }

    #[test]
    fn test_server_header_is_case_insensitive() {
        let data = "HTTP/1.1 200 OK\r\nserver: tiny\r\nLocation: http://h/d.xml\r\n\r\n";
        let response = parse_search_response(data).unwrap();
        assert_eq!(response.server, "tiny");
        assert!(!response.headers.contains_key("server"));
    }

    #[test]
    fn test_missing_server_uses_placeholder() {
        let data = "HTTP/1.1 200 OK\r\nLOCATION: http://h/d.xml\r\n\r\n";
        let response = parse_search_response(data).unwrap();
        assert_eq!(response.server, UNKNOWN_SERVER);
    }

    #[test]
    fn test_missing_location_is_malformed() {
        let data = "HTTP/1.1 200 OK\r\nSERVER: tiny\r\n\r\n";
        assert!(matches!(
            parse_search_response(data),
            Err(ExplorerError::MalformedResponse(_))
        ));
    }
}
