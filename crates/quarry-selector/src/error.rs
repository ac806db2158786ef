//! Error types for selector compilation and execution.

use thiserror::Error;

/// Failures reported by a [`QueryEngine`](crate::engine::QueryEngine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A required single-element lookup found nothing.
    #[error("no element matches `{expression}`")]
    NotFound {
        /// The expression that was evaluated.
        expression: String,
    },

    /// The engine cannot evaluate the expression (unknown syntax or an
    /// unsupported pseudo-class).
    #[error("invalid expression `{expression}`: {reason}")]
    InvalidExpression {
        /// The rejected expression.
        expression: String,
        /// Engine-specific explanation.
        reason: String,
    },

    /// The element is no longer attached to the document.
    #[error("stale element reference")]
    StaleElement,

    /// Any other driver failure (connection, protocol, ...).
    #[error("driver error: {0}")]
    Driver(String),
}

/// Errors raised while compiling or executing a selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// A pseudo-class argument does not follow its grammar.
    #[error("invalid argument for :{pseudo}(): {reason}")]
    Syntax {
        /// Pseudo-class name, without the colon.
        pseudo: String,
        /// The offending argument, verbatim.
        argument: String,
        /// Human-readable description of the accepted forms.
        reason: String,
    },

    /// No strategy or filter is registered for the pseudo-class.
    #[error("unsupported pseudo-class :{0}")]
    UnsupportedPseudoClass(String),

    /// The selector text itself is malformed.
    #[error("cannot parse selector `{selector}`: {reason}")]
    Parse {
        /// The selector text.
        selector: String,
        /// What went wrong.
        reason: String,
    },

    /// Nested selectors (`:has`, `:not`) exceed the configured depth.
    #[error("selector nesting exceeds the maximum depth of {max}")]
    NestingTooDeep {
        /// Configured maximum depth.
        max: usize,
    },

    /// The engine failed while executing a compiled selector.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SelectorError {
    pub(crate) fn parse(selector: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}
