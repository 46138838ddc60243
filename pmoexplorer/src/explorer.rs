//! # Pipeline facade
//!
//! [`UpnpExplorer`] chains the steps of a control-point session, each one
//! producing an immutable value consumed by the next:
//!
//! ```text
//! ServerRegistry -> ServerRecord -> DeviceDescription -> ServiceDescription
//!                -> ActionContext -> SoapRequest -> SoapResponse
//! ```
//!
//! ```no_run
//! use pmoexplorer::{ExplorerConfig, UpnpExplorer};
//!
//! let config = ExplorerConfig::load(None)?;
//! let explorer = UpnpExplorer::new();
//!
//! let registry = explorer.discover(&config)?;
//! let server = registry.resolve("sonos", 0)?;
//! let device = explorer.describe(server)?;
//! let service = explorer.describe_service(device.service("RenderingControl")?)?;
//! let request = service
//!     .prepare_action("GetVolume")?
//!     .into_request(service.descriptor(), [("Channel", "Master")])?;
//! let response = explorer.invoke(&request)?;
//! println!("{}", response.text());
//! # Ok::<(), pmoexplorer::ExplorerError>(())
//! ```

use tracing::info;
use url::Url;

use crate::actions::{
    self, ActionContext, ActionSignature, ArgumentDescriptor, Direction, StateVariableDescriptor,
};
use crate::config::ExplorerConfig;
use crate::description::{self, DeviceDescription, ServiceDescriptor};
use crate::discovery::{self, ServerRecord, ServerRegistry};
use crate::errors::Result;
use crate::soap::{self, SoapRequest, SoapResponse};
use crate::ssdp::SsdpClient;
use crate::transport::{HttpTransport, UreqTransport};
use crate::xml::XmlDocument;

/// A fetched service description together with the endpoints it was read from.
#[derive(Debug, Clone)]
pub struct ServiceDescription {
    descriptor: ServiceDescriptor,
    document: XmlDocument,
}

impl ServiceDescription {
    pub fn new(descriptor: ServiceDescriptor, document: XmlDocument) -> Self {
        Self {
            descriptor,
            document,
        }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn list_actions(&self) -> Result<Vec<ActionSignature>> {
        actions::list_actions(&self.document)
    }

    pub fn action_arguments(
        &self,
        action_name: &str,
        direction: Option<Direction>,
    ) -> Result<Vec<ArgumentDescriptor>> {
        actions::action_arguments(&self.document, action_name, direction)
    }

    pub fn related_state_variable(&self, action_name: &str, arg_name: &str) -> Result<String> {
        actions::related_state_variable(&self.document, action_name, arg_name)
    }

    pub fn state_variable_descriptor(
        &self,
        action_name: &str,
        arg_name: &str,
    ) -> Result<StateVariableDescriptor> {
        actions::state_variable_descriptor(&self.document, action_name, arg_name)
    }

    pub fn describe_action(
        &self,
        action_name: &str,
    ) -> Result<Vec<(ArgumentDescriptor, StateVariableDescriptor)>> {
        actions::describe_action(&self.document, action_name)
    }

    pub fn prepare_action(&self, action_name: &str) -> Result<ActionContext> {
        actions::prepare_action(&self.document, action_name)
    }
}

/// Control point driving discovery, description fetches and SOAP calls.
#[derive(Debug, Clone, Default)]
pub struct UpnpExplorer<T: HttpTransport = UreqTransport> {
    transport: T,
}

impl UpnpExplorer<UreqTransport> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: HttpTransport> UpnpExplorer<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs one SSDP search with the discovery settings of `config`.
    pub fn discover(&self, config: &ExplorerConfig) -> Result<ServerRegistry> {
        let client = SsdpClient::new(config.discovery.timeout(), config.discovery.buffer_size)
            .log_datagrams(config.discovery.log_datagrams);
        discovery::discover_with(&client)
    }

    /// Fetches the root description announced by `server`.
    pub fn describe(&self, server: &ServerRecord) -> Result<DeviceDescription> {
        let location = Url::parse(server.location())?;
        info!(server = server.id.as_str(), "Describing device at {}", location);
        DeviceDescription::fetch(&self.transport, &location)
    }

    pub fn describe_service(&self, service: &ServiceDescriptor) -> Result<ServiceDescription> {
        let document =
            description::fetch_service_description(&self.transport, &service.description_url)?;
        Ok(ServiceDescription::new(service.clone(), document))
    }

    pub fn invoke(&self, request: &SoapRequest) -> Result<SoapResponse> {
        soap::invoke(&self.transport, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ArgValue;
    use indexmap::IndexMap;

    struct StaticTransport;

    const ROOT: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType>
        <SCPDURL>/avt.xml</SCPDURL>
        <controlURL>/avt/control</controlURL>
      </service>
    </serviceList>
  </device>
</root>"#;

    const SCPD: &str = r#"<?xml version="1.0"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
  <actionList>
    <action>
      <name>Stop</name>
      <argumentList>
        <argument>
          <name>InstanceID</name>
          <direction>in</direction>
          <relatedStateVariable>A_ARG_TYPE_InstanceID</relatedStateVariable>
        </argument>
      </argumentList>
    </action>
  </actionList>
  <serviceStateTable>
    <stateVariable sendEvents="no">
      <name>A_ARG_TYPE_InstanceID</name>
      <dataType>ui4</dataType>
    </stateVariable>
  </serviceStateTable>
</scpd>"#;

    impl HttpTransport for StaticTransport {
        fn get(&self, url: &Url) -> Result<Vec<u8>> {
            match url.path() {
                "/desc.xml" => Ok(ROOT.as_bytes().to_vec()),
                "/avt.xml" => Ok(SCPD.as_bytes().to_vec()),
                other => panic!("unexpected GET {}", other),
            }
        }

        fn post(&self, _: &Url, _: &[(&str, String)], body: Vec<u8>) -> Result<SoapResponse> {
            Ok(SoapResponse::new(200, body))
        }
    }

    fn record(location: &str) -> ServerRecord {
        let mut properties = IndexMap::new();
        properties.insert("location".to_string(), location.to_string());
        ServerRecord {
            id: "Renderer_0".to_string(),
            server: "Renderer".to_string(),
            properties,
        }
    }

    #[test]
    fn test_pipeline_with_static_transport() {
        let explorer = UpnpExplorer::with_transport(StaticTransport);

        let device = explorer.describe(&record("http://10.0.0.5:1400/desc.xml")).unwrap();
        let service = explorer
            .describe_service(device.service("avtransport").unwrap())
            .unwrap();
        assert_eq!(
            service.descriptor().control_url.as_str(),
            "http://10.0.0.5:1400/avt/control"
        );

        let actions = service.list_actions().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "Stop");

        let request = service
            .prepare_action("Stop")
            .unwrap()
            .into_request(service.descriptor(), Vec::<(String, ArgValue)>::new())
            .unwrap();
        let response = explorer.invoke(&request).unwrap();
        assert!(response.text().contains("<InstanceID>0</InstanceID>"));
    }

    #[test]
    fn test_describe_rejects_bad_location() {
        let explorer = UpnpExplorer::with_transport(StaticTransport);
        assert!(explorer.describe(&record("not a url")).is_err());
    }
}
