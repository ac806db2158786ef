//! `XPath` 1.0 subset evaluated over a [`DomTree`].
//!
//! Covers what path-query locators use: abbreviated and unabbreviated
//! location paths on the `child`, `descendant`, `descendant-or-self`,
//! `parent`, `ancestor`, `ancestor-or-self`, `self`, `attribute`,
//! `following-sibling` and `preceding-sibling` axes, predicates with
//! position semantics, the boolean, comparison and arithmetic operators, and
//! the core function library minus namespaces, ids and language.
//!
//! # Submodules
//!
//! - [`ast`]: syntax tree types.
//! - [`lexer`]: tokenizer.
//! - [`parser`]: recursive descent parser.
//! - [`eval`]: evaluator and value model.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use quarry_dom::{DomTree, NodeId};
use thiserror::Error;

pub use eval::{Evaluator, Value, XNode};

/// Errors raised while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XPathError {
    /// A character no token starts with.
    #[error("unexpected character `{found}` at offset {offset}")]
    UnexpectedCharacter {
        /// The character.
        found: char,
        /// Character offset in the expression.
        offset: usize,
    },

    /// A string literal without its closing quote.
    #[error("unterminated string literal at offset {offset}")]
    UnterminatedLiteral {
        /// Character offset of the opening quote.
        offset: usize,
    },

    /// Tokens that do not form an expression.
    #[error("{0}")]
    Syntax(String),

    /// An axis outside the supported set.
    #[error("unsupported axis {0}::")]
    UnsupportedAxis(String),

    /// A function outside the supported library.
    #[error("unknown function {0}()")]
    UnknownFunction(String),

    /// A function called with the wrong number of arguments.
    #[error("{function}() expects {expected} argument(s), got {found}")]
    Arity {
        /// Function name.
        function: String,
        /// Accepted argument counts, for the message.
        expected: &'static str,
        /// Arguments passed.
        found: usize,
    },

    /// A node-set was required (a path step, a union, `count()`...).
    #[error("expected a node-set")]
    NotANodeSet,
}

/// Evaluate `expression` with `context` as the context node.
///
/// ```
/// use quarry_dom::{DomTree, NodeId};
/// use quarry_engine::xpath::{Value, evaluate};
///
/// let mut tree = DomTree::new();
/// let list = tree.append_element(NodeId::ROOT, "ul", &[]);
/// let _ = tree.append_element(list, "li", &[]);
/// let _ = tree.append_element(list, "li", &[]);
///
/// assert_eq!(evaluate(&tree, NodeId::ROOT, "count(//li)").unwrap(), Value::Number(2.0));
/// ```
pub fn evaluate(tree: &DomTree, context: NodeId, expression: &str) -> Result<Value, XPathError> {
    let expr = parser::parse(expression)?;
    let order = tree.document_order();
    Evaluator::new(tree, &order).evaluate(&expr, &XNode::Tree(context))
}

/// Evaluate a node-set expression and keep the tree nodes it selects, in
/// document order.
pub fn select(
    evaluator: &Evaluator<'_>,
    context: NodeId,
    expression: &str,
) -> Result<Vec<NodeId>, XPathError> {
    let expr = parser::parse(expression)?;
    match evaluator.evaluate(&expr, &XNode::Tree(context))? {
        Value::NodeSet(nodes) => Ok(nodes
            .into_iter()
            .filter_map(|node| match node {
                XNode::Tree(id) => Some(id),
                XNode::Attribute { .. } => None,
            })
            .collect()),
        _ => Err(XPathError::NotANodeSet),
    }
}
