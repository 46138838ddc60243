use tracing::debug;
use ureq::Agent;
use url::Url;

use crate::errors::{ExplorerError, Result};
use crate::soap::SoapResponse;

/// Blocking HTTP operations needed by the description fetchers and SOAP calls.
pub trait HttpTransport {
    /// GET `url` and return the body; non-2xx answers are errors.
    fn get(&self, url: &Url) -> Result<Vec<u8>>;

    /// POST `body` to `url` and return status and body, whatever the status.
    fn post(&self, url: &Url, headers: &[(&str, String)], body: Vec<u8>) -> Result<SoapResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, url: &Url) -> Result<Vec<u8>> {
        (**self).get(url)
    }

    fn post(&self, url: &Url, headers: &[(&str, String)], body: Vec<u8>) -> Result<SoapResponse> {
        (**self).post(url, headers, body)
    }
}

/// [`HttpTransport`] backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // 4xx/5xx must not become errors: SOAP faults come back as HTTP 500
        // and their body is still of interest to the caller.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn get(&self, url: &Url) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let mut response = self.agent.get(url.as_str()).call()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.body_mut().read_to_vec()?)
    }

    fn post(&self, url: &Url, headers: &[(&str, String)], body: Vec<u8>) -> Result<SoapResponse> {
        debug!("POST {} ({} bytes)", url, body.len());
        let mut request = self.agent.post(url.as_str());
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        let mut response = request.send(&body[..])?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec()?;
        Ok(SoapResponse::new(status, body))
    }
}
