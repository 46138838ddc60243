use xmltree::{Element, EmitterConfig, XMLNode};

use super::{SOAP_ENCODING_NS, SOAP_ENVELOPE_NS};
use crate::errors::Result;
use crate::inference::ArgValue;

/// Serializes the SOAP envelope calling `action` on `service_type` with `args`.
///
/// Arguments are emitted in iteration order, each as an unqualified child of the
/// action element.
pub fn build_soap_request<'a, I>(service_type: &str, action: &str, args: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a ArgValue)>,
{
    let mut action_elem = Element::new(&format!("u:{}", action));
    action_elem
        .attributes
        .insert("xmlns:u".to_string(), service_type.to_string());

    for (name, value) in args {
        let mut child = Element::new(name);
        child.children.push(XMLNode::Text(value.to_string()));
        action_elem.children.push(XMLNode::Element(child));
    }

    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(action_elem));

    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), SOAP_ENVELOPE_NS.to_string());
    envelope
        .attributes
        .insert("s:encodingStyle".to_string(), SOAP_ENCODING_NS.to_string());
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(false);
    envelope.write_with_config(&mut buf, config)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(element: &Element) -> Vec<&Element> {
        element.children.iter().filter_map(XMLNode::as_element).collect()
    }

    #[test]
    fn test_request_round_trip() {
        let channel = ArgValue::from("Master");
        let value = ArgValue::Int(10);
        let xml = build_soap_request(
            "urn:test:service:1",
            "SetVolume",
            [("Channel", &channel), ("Value", &value)],
        )
        .unwrap();

        let text = String::from_utf8(xml.clone()).unwrap();
        assert!(text.starts_with("<?xml"));

        let root = Element::parse(xml.as_slice()).unwrap();
        assert_eq!(root.name, "Envelope");
        assert_eq!(root.namespace.as_deref(), Some(SOAP_ENVELOPE_NS));

        let body = root.get_child("Body").unwrap();
        let actions = elements(body);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "SetVolume");
        assert_eq!(actions[0].namespace.as_deref(), Some("urn:test:service:1"));

        let args = elements(actions[0]);
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].name, "Channel");
        assert_eq!(args[0].get_text().unwrap(), "Master");
        assert_eq!(args[1].name, "Value");
        assert_eq!(args[1].get_text().unwrap(), "10");
    }

    #[test]
    fn test_encoding_style_is_declared() {
        let xml = build_soap_request("urn:test:service:1", "Stop", []).unwrap();
        let text = String::from_utf8(xml).unwrap();
        assert!(text.contains(r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/""#));
        assert!(text.contains(r#"xmlns:u="urn:test:service:1""#));
    }
}
