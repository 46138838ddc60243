//! Device description (root document) and service description fetching.

use tracing::{debug, info, warn};
use url::Url;

use crate::errors::{ExplorerError, LookupKind, Result};
use crate::transport::HttpTransport;
use crate::xml::{Query, XmlDocument};

/// Endpoints of one `<service>` of a device, all absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub service_type: String,
    pub control_url: Url,
    pub description_url: Url,
}

/// A fetched root description with its resolved services.
#[derive(Debug, Clone)]
pub struct DeviceDescription {
    pub location: Url,
    pub base_url: Url,
    pub document: XmlDocument,
    pub services: Vec<ServiceDescriptor>,
}

impl DeviceDescription {
    pub fn fetch<T: HttpTransport>(transport: &T, location: &Url) -> Result<Self> {
        let document = fetch_root(transport, location)?;
        let base_url = base_url(&document, location)?;
        let services = resolve_services(&document, location)?;
        info!(
            "{} service(s) described at {} (base {})",
            services.len(),
            location,
            base_url
        );
        Ok(Self {
            location: location.clone(),
            base_url,
            document,
            services,
        })
    }

    /// First service whose type contains `service_type`, ignoring case.
    pub fn service(&self, service_type: &str) -> Result<&ServiceDescriptor> {
        let needle = service_type.to_lowercase();
        self.services
            .iter()
            .find(|s| s.service_type.to_lowercase().contains(&needle))
            .ok_or_else(|| ExplorerError::not_found(LookupKind::Service, service_type))
    }
}

/// GETs and parses an XML document, keeping `url` as its base.
fn fetch_document<T: HttpTransport>(transport: &T, url: &Url) -> Result<XmlDocument> {
    let body = transport.get(url)?;
    debug!("Parsing {} bytes of XML from {}", body.len(), url);
    XmlDocument::parse(&body, Some(url.clone()))
}

pub fn fetch_root<T: HttpTransport>(transport: &T, location: &Url) -> Result<XmlDocument> {
    fetch_document(transport, location)
}

pub fn fetch_service_description<T: HttpTransport>(
    transport: &T,
    description_url: &Url,
) -> Result<XmlDocument> {
    fetch_document(transport, description_url)
}

/// `URLBase` of the document when declared (joined onto `location`), otherwise `scheme://host:port/` of `location`.
pub fn base_url(root: &XmlDocument, location: &Url) -> Result<Url> {
    let declared = root
        .root()
        .find_first(&Query::new().tag("urlbase"))
        .and_then(|e| e.text_opt());

    if let Some(declared) = declared {
        // A relative URLBase resolves against the location.
        return Ok(location.join(declared)?);
    }

    let mut base = location.clone();
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

/// One descriptor per `<service>`, URLs joined onto the base URL.
///
/// `controlURL`, `SCPDURL` and `serviceType` are collected independently and
/// paired by position.
pub fn resolve_services(root: &XmlDocument, location: &Url) -> Result<Vec<ServiceDescriptor>> {
    let base = base_url(root, location)?;
    let top = root.root();

    let control = top.find(&Query::new().tag("controlurl").parent("service"));
    let scpd = top.find(&Query::new().tag("scpdurl").parent("service"));
    let types = top.find(&Query::new().tag("servicetype").parent("service"));

    if control.len() != scpd.len() || control.len() != types.len() {
        warn!(
            "Unbalanced service list at {}: {} controlURL, {} SCPDURL, {} serviceType",
            location,
            control.len(),
            scpd.len(),
            types.len()
        );
    }

    control
        .iter()
        .zip(scpd.iter())
        .zip(types.iter())
        .map(|((control, scpd), service_type)| -> Result<ServiceDescriptor> {
            Ok(ServiceDescriptor {
                service_type: service_type.text().to_string(),
                control_url: base.join(control.text())?,
                description_url: base.join(scpd.text())?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>Kitchen</friendlyName>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:RenderingControl:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:RenderingControl</serviceId>
        <SCPDURL>/RenderingControl/desc.xml</SCPDURL>
        <controlURL>/RenderingControl/ctrl</controlURL>
        <eventSubURL>/RenderingControl/evt</eventSubURL>
      </service>
      <service>
        <serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:AVTransport</serviceId>
        <SCPDURL>AVTransport/desc.xml</SCPDURL>
        <controlURL>http://10.0.0.9:9000/AVTransport/ctrl</controlURL>
        <eventSubURL>/AVTransport/evt</eventSubURL>
      </service>
    </serviceList>
  </device>
</root>"#;

    fn location() -> Url {
        Url::parse("http://192.168.1.14:9197/dmr/description.xml?x=1").unwrap()
    }

    #[test]
    fn test_base_url_from_location() {
        let doc = XmlDocument::parse(ROOT.as_bytes(), None).unwrap();
        let base = base_url(&doc, &location()).unwrap();
        assert_eq!(base.as_str(), "http://192.168.1.14:9197/");
    }

    #[test]
    fn test_base_url_from_urlbase() {
        let xml = ROOT.replace(
            "<specVersion>",
            "<URLBase>http://192.168.1.14:8080/upnp/</URLBase><specVersion>",
        );
        let doc = XmlDocument::parse(xml.as_bytes(), None).unwrap();
        let services = resolve_services(&doc, &location()).unwrap();
        assert_eq!(
            services[1].description_url.as_str(),
            "http://192.168.1.14:8080/upnp/AVTransport/desc.xml"
        );
        assert_eq!(
            services[0].control_url.as_str(),
            "http://192.168.1.14:8080/RenderingControl/ctrl"
        );
    }

    #[test]
    fn test_relative_urlbase_joins_location() {
        let xml = ROOT.replace("<specVersion>", "<URLBase>/upnp/</URLBase><specVersion>");
        let doc = XmlDocument::parse(xml.as_bytes(), None).unwrap();
        let base = base_url(&doc, &location()).unwrap();
        assert_eq!(base.as_str(), "http://192.168.1.14:9197/upnp/");

        let services = resolve_services(&doc, &location()).unwrap();
        assert_eq!(
            services[1].description_url.as_str(),
            "http://192.168.1.14:9197/upnp/AVTransport/desc.xml"
        );
    }

    #[test]
    fn test_resolve_services() {
        let doc = XmlDocument::parse(ROOT.as_bytes(), None).unwrap();
        let services = resolve_services(&doc, &location()).unwrap();
        assert_eq!(services.len(), 2);

        assert_eq!(
            services[0].service_type,
            "urn:schemas-upnp-org:service:RenderingControl:1"
        );
        assert_eq!(
            services[0].control_url.as_str(),
            "http://192.168.1.14:9197/RenderingControl/ctrl"
        );
        assert_eq!(
            services[0].description_url.as_str(),
            "http://192.168.1.14:9197/RenderingControl/desc.xml"
        );
        assert_eq!(
            services[1].control_url.as_str(),
            "http://10.0.0.9:9000/AVTransport/ctrl"
        );
        assert_eq!(
            services[1].description_url.as_str(),
            "http://192.168.1.14:9197/AVTransport/desc.xml"
        );
    }

    #[test]
    fn test_service_lookup() {
        let doc = XmlDocument::parse(ROOT.as_bytes(), None).unwrap();
        let description = DeviceDescription {
            location: location(),
            base_url: base_url(&doc, &location()).unwrap(),
            services: resolve_services(&doc, &location()).unwrap(),
            document: doc,
        };
        let service = description.service("avtransport").unwrap();
        assert!(service.service_type.ends_with("AVTransport:1"));
        assert!(description.service("ContentDirectory").unwrap_err().is_not_found());
    }
}
