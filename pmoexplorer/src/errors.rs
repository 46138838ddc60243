use std::fmt;

use thiserror::Error;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Server,
    Service,
    Action,
    Argument,
    RelatedStateVariable,
    StateVariable,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupKind::Server => "server",
            LookupKind::Service => "service",
            LookupKind::Action => "action",
            LookupKind::Argument => "argument",
            LookupKind::RelatedStateVariable => "related state variable",
            LookupKind::StateVariable => "state variable",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("No {kind} matching '{name}'")]
    NotFound { kind: LookupKind, name: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("XML parse error: {0}")]
    Xml(#[from] xmltree::ParseError),
    #[error("XML write error: {0}")]
    XmlWrite(#[from] xmltree::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("{url} answered with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("No value available for input argument {0}")]
    UnresolvedArgument(String),
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl ExplorerError {
    pub fn not_found(kind: LookupKind, name: &str) -> Self {
        ExplorerError::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ExplorerError::MalformedResponse(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ExplorerError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
