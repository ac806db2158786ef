//! Document tree used by the Quarry in-memory query engine.
//!
//! An arena of nodes modelled on the [DOM](https://dom.spec.whatwg.org/)
//! node tree, reduced to what selector and path queries read: element names,
//! attributes, character data, and parent/child/sibling links.
//!
//! Nodes are addressed by [`NodeId`], an index into the arena, so queries can
//! hand ids around freely while the tree is borrowed immutably. Ids follow
//! allocation order, not tree order; [`DomTree::document_order`] maps each id
//! to its pre-order rank for sorting results.

use std::collections::{HashMap, HashSet};

mod fixture;

pub use fixture::{DocumentSpec, NodeSpec};

/// Attribute name to value.
pub type Attributes = HashMap<String, String>;

/// Index of a node in its [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The Document node; every tree has one, at index 0.
    pub const ROOT: Self = Self(0);
}

/// A node and its tree links.
///
/// Links are kept consistent by [`DomTree::append_child`]; a node that was
/// allocated but never appended has none.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its payload.
    pub node_type: NodeType,
    /// [parent](https://dom.spec.whatwg.org/#concept-tree-parent)
    pub parent: Option<NodeId>,
    /// [children](https://dom.spec.whatwg.org/#concept-tree-child), in order.
    pub children: Vec<NodeId>,
    /// [next sibling](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,
    /// [previous sibling](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    const fn detached(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// The node kinds queries can see.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The tree root.
    Document,
    /// An element.
    Element(ElementData),
    /// Character data.
    Text(String),
    /// A comment; invisible to `*`, `text()` and `:empty`.
    Comment(String),
}

/// Name and attributes of an element.
///
/// Namespaces are not modelled.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Local name, ASCII-lowercased.
    pub tag_name: String,
    /// Attributes, names as given.
    pub attrs: Attributes,
}

impl ElementData {
    /// Element data with a lowercased tag name.
    #[must_use]
    pub fn new(tag_name: &str, attrs: Attributes) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
        }
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// The whitespace-separated tokens of the `class` attribute.
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attr("class")
            .map_or_else(HashSet::new, |list| list.split_ascii_whitespace().collect())
    }

    /// An attribute value, `Some("")` for a valueless attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// Indexed by `NodeId`; slot 0 holds the Document.
    nodes: Vec<Node>,
}

impl DomTree {
    /// A tree holding only the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeType::Document)],
        }
    }

    /// The Document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The node behind `id`, if it was allocated in this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of allocated nodes, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the Document node exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Store a node without attaching it anywhere.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        self.nodes.push(Node::detached(node_type));
        NodeId(self.nodes.len() - 1)
    }

    /// Attach `child` after the current last child of `parent`.
    ///
    /// `child` must be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let previous = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);

        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.prev_sibling = previous;
        if let Some(previous) = previous {
            self.nodes[previous.0].next_sibling = Some(child);
        }
    }

    /// Allocate an element with the given attributes and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|&(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let id = self.alloc(NodeType::Element(ElementData::new(tag, attrs)));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeType::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// The parent node; `None` for the Document and detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// All child nodes, elements or not.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Child elements only.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.as_element(child).is_some())
    }

    /// The sibling right after `id`, of any node kind.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling
    }

    /// The sibling right before `id`, of any node kind.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling
    }

    /// Whether `ancestor` is a strict ancestor of `descendant`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Parent, grandparent, ... up to the Document.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Walk<'_> {
        Walk::new(self, self.parent(id), Self::parent)
    }

    /// Earlier siblings, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> Walk<'_> {
        Walk::new(self, self.prev_sibling(id), Self::prev_sibling)
    }

    /// Later siblings, nearest first.
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> Walk<'_> {
        Walk::new(self, self.next_sibling(id), Self::next_sibling)
    }

    /// Every node below `id` in tree order, `id` itself excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            pending: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Tree-order rank of every node, indexed by `NodeId`.
    ///
    /// The Document ranks 0. Nodes outside the tree rank `usize::MAX`.
    #[must_use]
    pub fn document_order(&self) -> Vec<usize> {
        let mut order = vec![usize::MAX; self.nodes.len()];
        order[NodeId::ROOT.0] = 0;
        for (rank, id) in (1..).zip(self.descendants(NodeId::ROOT)) {
            order[id.0] = rank;
        }
        order
    }

    /// Element data, when `id` is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.get(id)?.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Character data, when `id` is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.node_type {
            NodeType::Text(text) => Some(text),
            _ => None,
        }
    }

    /// [textContent](https://dom.spec.whatwg.org/#dom-node-textcontent):
    /// the node's own data for text, otherwise all descendant text joined.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match self.as_text(id) {
            Some(text) => text.to_string(),
            None => self
                .descendants(id)
                .filter_map(|node| self.as_text(node))
                .collect(),
        }
    }

    /// The first element child of the Document (normally `<html>`).
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Follows one kind of link (parent, previous or next sibling) until it runs out.
pub struct Walk<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
    step: fn(&DomTree, NodeId) -> Option<NodeId>,
}

impl<'a> Walk<'a> {
    const fn new(
        tree: &'a DomTree,
        first: Option<NodeId>,
        step: fn(&DomTree, NodeId) -> Option<NodeId>,
    ) -> Self {
        Self {
            tree,
            next: first,
            step,
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = (self.step)(self.tree, current);
        Some(current)
    }
}

/// Pre-order walk below a node.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    pending: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.pending.pop()?;
        self.pending
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
