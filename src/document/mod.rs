//! OPGEE configuration document
//!
//! An owned XML tree that is loaded once, reconciled with the run's field
//! records, and written back wholesale. Attribute order and unrelated nodes
//! survive the round trip; insignificant whitespace does not.

mod merge;
mod serialize;

pub use merge::{AnalysisSettings, DocumentMerger, MergeReport, FIELD_TAG, TEMPLATE_MARKER};
pub use serialize::{save, to_canonical_bytes};

use crate::error::FuseResult;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Root element name for a freshly created document
pub const ROOT_TAG: &str = "Model";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Concatenated text content of direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all text children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|n| !matches!(n, Node::Text(_)));
        let text = text.into();
        if !text.is_empty() {
            self.children.insert(0, Node::Text(text));
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given tag and `name` attribute
    pub fn find_named(&self, tag: &str, name: &str) -> Option<&Element> {
        self.elements()
            .find(|e| e.name == tag && e.attr("name") == Some(name))
    }

    pub fn find_named_mut(&mut self, tag: &str, name: &str) -> Option<&mut Element> {
        self.elements_mut()
            .find(|e| e.name == tag && e.attr("name") == Some(name))
    }

    /// Depth-first walk over this element and all descendants
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = vec![self];
        for child in self.elements() {
            out.extend(child.descendants());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Empty document with a bare `<Model>` root
    pub fn new() -> Self {
        Self {
            root: Element::new(ROOT_TAG),
        }
    }

    pub fn parse(text: &str) -> FuseResult<Self> {
        let doc = roxmltree::Document::parse(text)?;
        Ok(Self {
            root: build_element(doc.root_element()),
        })
    }

    /// Load from disk; a missing or empty file yields a fresh document
    pub fn load(path: &Path) -> FuseResult<Self> {
        if !path.exists() || fs::metadata(path)?.len() == 0 {
            info!(document = %path.display(), "no existing document, starting fresh");
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)?;
        let doc = Self::parse(&text)?;
        debug!(
            document = %path.display(),
            children = doc.root.children.len(),
            "loaded document"
        );
        Ok(doc)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefix bound to the `xml` namespace, which is never declared
const XML_PREFIX: &str = "xml";

fn build_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(qualified_name(node, tag.namespace(), tag.name()));

    // Only declarations the parent does not already carry
    let inherited = node.parent_element();
    for ns in node.namespaces() {
        if ns.name() == Some(XML_PREFIX) {
            continue;
        }
        let declared_above = inherited
            .map(|p| p.namespaces().any(|pn| pn.name() == ns.name() && pn.uri() == ns.uri()))
            .unwrap_or(false);
        if declared_above {
            continue;
        }
        let key = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        element.attributes.push((key, ns.uri().to_string()));
    }

    for attr in node.attributes() {
        element.attributes.push((
            qualified_name(node, attr.namespace(), attr.name()),
            attr.value().to_string(),
        ));
    }

    // Indentation between child nodes is regenerated on save; text that is
    // the whole content of an element is kept verbatim
    let mixed = node
        .children()
        .any(|c| c.is_element() || c.is_comment());

    for child in node.children() {
        match child.node_type() {
            roxmltree::NodeType::Element => element.push(build_element(child)),
            roxmltree::NodeType::Text => {
                let text = child.text().unwrap_or_default();
                if !(mixed && text.trim().is_empty()) {
                    element.children.push(Node::Text(text.to_string()));
                }
            }
            roxmltree::NodeType::Comment => {
                let text = child.text().unwrap_or_default();
                element.children.push(Node::Comment(text.to_string()));
            }
            _ => {}
        }
    }
    element
}

fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}
