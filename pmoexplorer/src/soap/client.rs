use indexmap::IndexMap;
use tracing::{debug, info, warn};
use url::Url;

use super::build_soap_request;
use crate::errors::Result;
use crate::inference::ArgValue;
use crate::transport::HttpTransport;

/// A fully resolved UPnP action call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest {
    pub control_url: Url,
    pub service_type: String,
    pub action_name: String,
    pub input_args: IndexMap<String, ArgValue>,
}

impl SoapRequest {
    pub fn new(control_url: Url, service_type: &str, action_name: &str) -> Self {
        Self {
            control_url,
            service_type: service_type.to_string(),
            action_name: action_name.to_string(),
            input_args: IndexMap::new(),
        }
    }

    pub fn with_arg(mut self, name: &str, value: impl Into<ArgValue>) -> Self {
        self.input_args.insert(name.to_string(), value.into());
        self
    }

    /// Value of the `SOAPAction` header, quotes included.
    pub fn soap_action(&self) -> String {
        format!(r#""{}#{}""#, self.service_type, self.action_name)
    }

    pub fn body(&self) -> Result<Vec<u8>> {
        build_soap_request(
            &self.service_type,
            &self.action_name,
            self.input_args.iter().map(|(k, v)| (k.as_str(), v)),
        )
    }
}

/// HTTP status and trimmed body of a SOAP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl SoapResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// POSTs `request` to its control URL and returns the raw answer.
///
/// SOAP faults are not interpreted: a fault comes back as a response with a
/// non-2xx status.
pub fn invoke<T: HttpTransport>(transport: &T, request: &SoapRequest) -> Result<SoapResponse> {
    let body = request.body()?;
    let headers = [
        ("SOAPAction", request.soap_action()),
        ("Content-Type", "text/xml".to_string()),
        ("Content-Length", body.len().to_string()),
    ];

    info!(
        action = request.action_name.as_str(),
        "Invoking {} on {}", request.service_type, request.control_url
    );
    debug!("SOAP request body: {}", String::from_utf8_lossy(&body));

    let response = transport.post(&request.control_url, &headers, body)?;
    if !response.is_success() {
        warn!(
            action = request.action_name.as_str(),
            "SOAP call answered with HTTP status {}", response.status
        );
    }

    Ok(SoapResponse::new(
        response.status,
        response.body.trim_ascii().to_vec(),
    ))
}
