//! The contract Quarry needs from a document-tree driver.

use std::fmt;
use std::hash::Hash;

use crate::error::EngineError;

/// Which expression language a locator is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// A CSS selector evaluated by the engine itself.
    Native,
    /// An `XPath` 1.0 expression.
    Path,
}

/// An adapter over a live document tree.
/// Implement this for your driver.
///
/// Every call is blocking; Quarry never retries. Queries issued from an
/// element are scoped to it: native queries return matching descendants,
/// path queries are evaluated with the element as context node.
pub trait QueryEngine {
    /// Handle to an element (or the document). Equality must mean "same node".
    type Element: Clone + Eq + Hash + fmt::Debug;

    /// The document node, used as the root of probes and `:not` lookups.
    fn document(&self) -> Self::Element;

    /// Identity of the engine's capability set. Engines that answer probes
    /// identically must return the same id so probe results can be shared.
    fn capability_id(&self) -> String;

    /// Evaluate `expression` from `context` and return every matching element
    /// in document order. No match is an empty vector, not an error.
    fn find_all(
        &self,
        context: &Self::Element,
        expression: &str,
        kind: QueryKind,
    ) -> Result<Vec<Self::Element>, EngineError>;

    /// Evaluate `expression` from `context` and return the first match.
    fn find_one(
        &self,
        context: &Self::Element,
        expression: &str,
        kind: QueryKind,
    ) -> Result<Self::Element, EngineError> {
        self.find_all(context, expression, kind)?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::NotFound {
                expression: expression.to_string(),
            })
    }

    /// Attribute value, or `None` when the attribute is absent.
    fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>, EngineError>;

    /// Whether the element is rendered.
    fn is_displayed(&self, element: &Self::Element) -> Result<bool, EngineError>;

    /// Lowercase local name of the element.
    fn tag_name(&self, element: &Self::Element) -> Result<String, EngineError>;
}
