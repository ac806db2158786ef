//! In-memory [`QueryEngine`] over a [`DomTree`].
//!
//! # Scope
//!
//! - **Native queries**: CSS selector lists matched right to left
//!   ([Selectors Level 4](https://www.w3.org/TR/selectors-4/)), with a
//!   configurable set of supported structural pseudo-classes so a legacy
//!   driver can be imitated.
//! - **Path queries**: an [`xpath`] 1.0 evaluator.
//! - **Rendering**: `hidden`, inline `display: none` and hidden inputs,
//!   inherited from ancestors.
//!
//! ```
//! use quarry_dom::{DomTree, NodeId};
//! use quarry_engine::MemoryEngine;
//! use quarry_selector::SelectorCompiler;
//!
//! let mut tree = DomTree::new();
//! let list = tree.append_element(NodeId::ROOT, "ul", &[]);
//! let first = tree.append_element(list, "li", &[]);
//! let _ = tree.append_element(list, "li", &[]);
//!
//! let engine = MemoryEngine::new(&tree);
//! let compiled = SelectorCompiler::default().compile(&engine, "li:first-child").unwrap();
//! assert_eq!(compiled.execute(&engine, &NodeId::ROOT).unwrap(), vec![first]);
//! ```

mod matcher;
pub mod xpath;

use std::cell::Cell;
use std::collections::HashSet;

use log::trace;
use quarry_dom::{DomTree, NodeId, NodeType};
use quarry_selector::pseudo::StrategyKind;
use quarry_selector::{EngineError, QueryEngine, QueryKind};

/// Every structural pseudo-class the native matcher knows.
pub const ALL_STRATEGIES: [StrategyKind; 7] = [
    StrategyKind::NthChild,
    StrategyKind::NthLastChild,
    StrategyKind::FirstChild,
    StrategyKind::LastChild,
    StrategyKind::OnlyChild,
    StrategyKind::Empty,
    StrategyKind::Root,
];

/// A [`QueryEngine`] answering queries against a borrowed [`DomTree`].
///
/// Elements are [`NodeId`]s; [`NodeId::ROOT`] is the document.
#[derive(Debug)]
pub struct MemoryEngine<'a> {
    tree: &'a DomTree,
    order: Vec<usize>,
    native: HashSet<StrategyKind>,
    native_queries: Cell<usize>,
}

impl<'a> MemoryEngine<'a> {
    /// An engine that supports every structural pseudo-class natively.
    #[must_use]
    pub fn new(tree: &'a DomTree) -> Self {
        Self::with_native_pseudo_classes(tree, ALL_STRATEGIES)
    }

    /// An engine whose native matcher only accepts the given pseudo-classes;
    /// any other pseudo-class makes a native query fail.
    #[must_use]
    pub fn with_native_pseudo_classes(
        tree: &'a DomTree,
        native: impl IntoIterator<Item = StrategyKind>,
    ) -> Self {
        Self {
            tree,
            order: tree.document_order(),
            native: native.into_iter().collect(),
            native_queries: Cell::new(0),
        }
    }

    /// An engine without native pseudo-class support, like an old driver.
    #[must_use]
    pub fn without_native_pseudo_classes(tree: &'a DomTree) -> Self {
        Self::with_native_pseudo_classes(tree, [])
    }

    /// The tree queries run against.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    /// Number of native queries answered so far, probes included.
    #[must_use]
    pub fn native_queries(&self) -> usize {
        self.native_queries.get()
    }

    fn check(&self, id: NodeId) -> Result<(), EngineError> {
        // Detached nodes sort after everything attached.
        match self.order.get(id.0) {
            Some(&position) if position != usize::MAX => Ok(()),
            _ => Err(EngineError::StaleElement),
        }
    }

    /// Rendering rules: the `hidden` attribute, an inline `display: none`
    /// and `<input type="hidden">`.
    fn hides_itself(&self, id: NodeId) -> bool {
        let Some(element) = self.tree.as_element(id) else {
            return false;
        };
        if element.attr("hidden").is_some() {
            return true;
        }
        if element.tag_name == "input"
            && element
                .attr("type")
                .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("hidden"))
        {
            return true;
        }
        element.attr("style").is_some_and(|style| {
            style.split(';').any(|declaration| {
                declaration.split_once(':').is_some_and(|(property, value)| {
                    property.trim().eq_ignore_ascii_case("display")
                        && value.trim().eq_ignore_ascii_case("none")
                })
            })
        })
    }
}

impl QueryEngine for MemoryEngine<'_> {
    type Element = NodeId;

    fn document(&self) -> NodeId {
        self.tree.root()
    }

    fn capability_id(&self) -> String {
        let mut names: Vec<&str> = self.native.iter().map(|kind| kind.name()).collect();
        names.sort_unstable();
        format!("memory[{}]", names.join(","))
    }

    fn find_all(
        &self,
        context: &NodeId,
        expression: &str,
        kind: QueryKind,
    ) -> Result<Vec<NodeId>, EngineError> {
        self.check(*context)?;
        trace!("{kind:?} query `{expression}` from {context:?}");

        let found = match kind {
            QueryKind::Native => {
                self.native_queries.set(self.native_queries.get() + 1);
                matcher::select(self.tree, &self.native, *context, expression)?
            }
            QueryKind::Path => {
                let evaluator = xpath::Evaluator::new(self.tree, &self.order);
                xpath::select(&evaluator, *context, expression).map_err(|error| {
                    EngineError::InvalidExpression {
                        expression: expression.to_string(),
                        reason: error.to_string(),
                    }
                })?
            }
        };

        Ok(found
            .into_iter()
            .filter(|&id| self.tree.as_element(id).is_some())
            .collect())
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Result<Option<String>, EngineError> {
        self.check(*element)?;
        Ok(self
            .tree
            .as_element(*element)
            .and_then(|data| data.attr(name))
            .map(str::to_string))
    }

    fn is_displayed(&self, element: &NodeId) -> Result<bool, EngineError> {
        self.check(*element)?;
        if self.tree.as_element(*element).is_none() {
            return Ok(false);
        }
        Ok(!self.hides_itself(*element)
            && !self
                .tree
                .ancestors(*element)
                .any(|ancestor| self.hides_itself(ancestor)))
    }

    fn tag_name(&self, element: &NodeId) -> Result<String, EngineError> {
        self.check(*element)?;
        match self.tree.get(*element).map(|node| &node.node_type) {
            Some(NodeType::Element(data)) => Ok(data.tag_name.clone()),
            Some(NodeType::Document) => Ok("#document".to_string()),
            Some(NodeType::Text(_)) => Ok("#text".to_string()),
            Some(NodeType::Comment(_)) => Ok("#comment".to_string()),
            None => Err(EngineError::StaleElement),
        }
    }
}
