use super::XmlElement;

/// Filter over three axes of an element: its text, its tag and its parent's tag.
///
/// Comparisons ignore case. By default a filter matches when it is a substring
/// of the candidate value; [`Query::exact`] requires equality instead. An empty
/// filter accepts every candidate on its axis, in both modes.
///
/// ```
/// use pmoexplorer::xml::{Query, XmlDocument};
///
/// let doc = XmlDocument::parse(
///     b"<scpd><action><name>Play</name></action></scpd>",
///     None,
/// ).unwrap();
/// let hits = doc.root().find(&Query::new().tag("name").parent("action"));
/// assert_eq!(hits[0].text(), "Play");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    text: String,
    tag: String,
    parent: String,
    exact: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into().to_lowercase();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into().to_lowercase();
        self
    }

    pub fn parent(mut self, parent_tag: impl Into<String>) -> Self {
        self.parent = parent_tag.into().to_lowercase();
        self
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn accepts(&self, element: &XmlElement<'_>) -> bool {
        let parent_tag = element.parent().map(|p| p.tag()).unwrap_or("");
        self.axis_matches(&self.text, element.text())
            && self.axis_matches(&self.tag, element.tag())
            && self.axis_matches(&self.parent, parent_tag)
    }

    fn axis_matches(&self, filter: &str, candidate: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        let candidate = candidate.to_lowercase();
        if self.exact {
            candidate == filter
        } else {
            candidate.contains(filter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    const SCPD: &str = r#"<?xml version="1.0"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
  <actionList>
    <action>
      <name>GetVolume</name>
      <argumentList>
        <argument><name>InstanceID</name><direction>in</direction></argument>
        <argument><name>CurrentVolume</name><direction>out</direction></argument>
      </argumentList>
    </action>
    <action>
      <name>GetVolumeDB</name>
    </action>
  </actionList>
  <serviceStateTable>
    <stateVariable><name>Volume</name></stateVariable>
    <stateVariable><name>VolumeDB</name></stateVariable>
  </serviceStateTable>
</scpd>"#;

    fn doc() -> XmlDocument {
        XmlDocument::parse(SCPD.as_bytes(), None).unwrap()
    }

    fn texts(elements: &[XmlElement<'_>]) -> Vec<String> {
        elements.iter().map(|e| e.text().to_string()).collect()
    }

    #[test]
    fn test_substring_match_in_document_order() {
        let doc = doc();
        let hits = doc.root().find(&Query::new().tag("NAME").parent("argument"));
        assert_eq!(texts(&hits), vec!["InstanceID", "CurrentVolume"]);
    }

    #[test]
    fn test_empty_query_matches_every_descendant() {
        let doc = doc();
        let hits = doc.root().find(&Query::new());
        assert_eq!(hits.len(), doc.len() - 1);
        assert_eq!(hits[0].tag(), "actionList");
    }

    #[test]
    fn test_exact_match_avoids_substring_collisions() {
        let doc = doc();
        let loose = doc
            .root()
            .find(&Query::new().tag("name").parent("statevariable").text("volume"));
        assert_eq!(loose.len(), 2);

        let exact = doc.root().find(
            &Query::new()
                .tag("name")
                .parent("statevariable")
                .text("volume")
                .exact(),
        );
        assert_eq!(texts(&exact), vec!["Volume"]);
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let doc = doc();
        let hits = doc
            .root()
            .find(&Query::new().tag("name").parent("action").text("getvolume"));
        assert_eq!(texts(&hits), vec!["GetVolume", "GetVolumeDB"]);
    }

    #[test]
    fn test_find_is_repeatable() {
        let doc = doc();
        let query = Query::new().tag("direction");
        let first = doc.root().find(&query);
        let second = doc.root().find(&query);
        assert_eq!(first, second);
        assert_eq!(texts(&first), vec!["in", "out"]);
    }

    #[test]
    fn test_root_is_not_a_candidate() {
        let doc = doc();
        assert!(doc.root().find(&Query::new().tag("scpd")).is_empty());
    }

    #[test]
    fn test_search_is_scoped_to_subtree() {
        let doc = doc();
        let action = doc
            .root()
            .find_first(&Query::new().tag("action").parent("actionlist").exact())
            .unwrap();
        let names = action.find(&Query::new().tag("name").exact());
        assert_eq!(texts(&names), vec!["GetVolume", "InstanceID", "CurrentVolume"]);
    }
}
