//! # XML tree for device and service descriptions
//!
//! UPnP descriptions are namespaced, schema-free documents. They are parsed with
//! `xmltree` and then flattened into an arena so that every element can reach its
//! parent by index. The parent link is only ever read to compare tag names.
//!
//! - [`XmlDocument`] : owns the arena and the URL the document was fetched from
//! - [`XmlElement`] : a cheap, copyable handle on one element
//! - [`Query`] : the multi-axis filter used to search a subtree

mod query;

pub use query::Query;

use url::Url;
use xmltree::{Element, XMLNode};

use crate::errors::Result;

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    text: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<NodeData>,
    base_url: Option<Url>,
}

impl XmlDocument {
    /// Parses `bytes`, remembering `base_url` for relative reference resolution.
    pub fn parse(bytes: &[u8], base_url: Option<Url>) -> Result<Self> {
        let root = Element::parse(bytes)?;
        let mut document = Self {
            nodes: Vec::new(),
            base_url,
        };
        document.push(&root, None);
        Ok(document)
    }

    fn push(&mut self, element: &Element, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        let text = element
            .get_text()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        self.nodes.push(NodeData {
            tag: local_name(&element.name).to_string(),
            text,
            parent,
            children: Vec::new(),
        });

        for child in element.children.iter().filter_map(XMLNode::as_element) {
            let child_id = self.push(child, Some(id));
            self.nodes[id].children.push(child_id);
        }

        id
    }

    pub fn root(&self) -> XmlElement<'_> {
        XmlElement { doc: self, id: 0 }
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Number of elements in the document, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Drops any `prefix:` or `{namespace}` qualification from a tag.
fn local_name(tag: &str) -> &str {
    tag.rsplit(|c| c == ':' || c == '}').next().unwrap_or(tag)
}

/// Handle on one element of an [`XmlDocument`].
#[derive(Clone, Copy)]
pub struct XmlElement<'a> {
    doc: &'a XmlDocument,
    id: usize,
}

impl<'a> XmlElement<'a> {
    fn data(self) -> &'a NodeData {
        &self.doc.nodes[self.id]
    }

    /// Local tag name, without namespace prefix.
    pub fn tag(self) -> &'a str {
        &self.data().tag
    }

    /// Trimmed text content, or an empty string.
    pub fn text(self) -> &'a str {
        self.data().text.as_deref().unwrap_or("")
    }

    pub fn text_opt(self) -> Option<&'a str> {
        self.data().text.as_deref()
    }

    pub fn parent(self) -> Option<XmlElement<'a>> {
        self.data().parent.map(|id| XmlElement { doc: self.doc, id })
    }

    /// Direct children, in document order.
    pub fn children(self) -> impl Iterator<Item = XmlElement<'a>> + 'a {
        let doc = self.doc;
        self.data()
            .children
            .iter()
            .map(move |&id| XmlElement { doc, id })
    }

    /// First direct child whose tag equals `tag`, ignoring case.
    pub fn child(self, tag: &str) -> Option<XmlElement<'a>> {
        self.children()
            .find(|child| child.tag().eq_ignore_ascii_case(tag))
    }

    /// Every descendant accepted by `query`, depth-first in document order.
    pub fn find(self, query: &Query) -> Vec<XmlElement<'a>> {
        let mut results = Vec::new();
        self.collect(query, &mut results);
        results
    }

    pub fn find_first(self, query: &Query) -> Option<XmlElement<'a>> {
        self.find(query).into_iter().next()
    }

    fn collect(self, query: &Query, results: &mut Vec<XmlElement<'a>>) {
        for child in self.children() {
            if query.accepts(&child) {
                results.push(child);
            }
            child.collect(query, results);
        }
    }
}

impl PartialEq for XmlElement<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for XmlElement<'_> {}

impl std::fmt::Debug for XmlElement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlElement")
            .field("tag", &self.tag())
            .field("text", &self.text())
            .finish()
    }
}
