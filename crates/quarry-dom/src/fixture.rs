//! Serde-loadable document descriptions.
//!
//! Quarry does not parse HTML; documents used by the CLI and the tests are
//! described as nested JSON:
//!
//! ```json
//! { "children": [
//!     { "tag": "html", "attrs": { "lang": "en" }, "children": [
//!         { "tag": "body", "children": [ { "text": "hello" } ] }
//!     ] }
//! ] }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{DomTree, ElementData, NodeId, NodeType};

/// A whole document: the children of the Document node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentSpec {
    /// Top-level nodes, normally a single `html` element.
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// One node of a [`DocumentSpec`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    /// An element with optional attributes and children.
    Element {
        /// Local name; lowercased when built.
        tag: String,
        /// Attribute list.
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        /// Child nodes in order.
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    /// A text node.
    Text {
        /// Character data.
        text: String,
    },
    /// A comment node.
    Comment {
        /// Comment data.
        comment: String,
    },
}

impl DomTree {
    /// Build a tree from a parsed document description.
    #[must_use]
    pub fn from_spec(spec: &DocumentSpec) -> Self {
        let mut tree = Self::new();
        for child in &spec.children {
            tree.append_spec(NodeId::ROOT, child);
        }
        tree
    }

    /// Parse a JSON document description and build the tree.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let spec: DocumentSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(&spec))
    }

    fn append_spec(&mut self, parent: NodeId, spec: &NodeSpec) {
        match spec {
            NodeSpec::Element {
                tag,
                attrs,
                children,
            } => {
                let attrs = attrs
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                let id = self.alloc(NodeType::Element(ElementData::new(tag, attrs)));
                self.append_child(parent, id);
                for child in children {
                    self.append_spec(id, child);
                }
            }
            NodeSpec::Text { text } => {
                let _ = self.append_text(parent, text);
            }
            NodeSpec::Comment { comment } => {
                let id = self.alloc(NodeType::Comment(comment.clone()));
                self.append_child(parent, id);
            }
        }
    }
}
