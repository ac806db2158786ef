//! Pseudo-class registry.
//!
//! Every supported pseudo-class resolves, by exact name, to one of two closed
//! sets of behaviours:
//! - a [`StrategyKind`]: expressible as a native query *or* a path query, the
//!   choice depending on what the engine supports;
//! - a [`FilterKind`]: not expressible as a query at all, evaluated in-process
//!   against located candidates.

mod strategy;

pub use strategy::StrategyKind;

use crate::ast::Condition;
use crate::error::SelectorError;

/// Pseudo-classes evaluated by in-process filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// `:has(<relative selector list>)`
    Has,
    /// `:not(<selector list>)`
    Not,
    /// `:lang(<code>)`
    Lang,
    /// `:visible` (displayed, and not a `<title>`)
    Visible,
    /// `:hidden`, the negation of `:visible`
    Hidden,
}

impl FilterKind {
    /// Name as written after the colon.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Has => "has",
            Self::Not => "not",
            Self::Lang => "lang",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }

    /// Reject a missing or unexpected argument.
    pub fn check_argument(self, condition: &Condition) -> Result<(), SelectorError> {
        let takes_argument = matches!(self, Self::Has | Self::Not | Self::Lang);
        check_arity(self.name(), takes_argument, condition)
    }
}

/// What the compiler does with a pseudo-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Translate into a native or path query fragment.
    Query(StrategyKind),
    /// Evaluate as a post-filter.
    Filter(FilterKind),
}

impl Behavior {
    /// Look a pseudo-class up by name (ASCII case-insensitive).
    pub fn resolve(name: &str) -> Result<Self, SelectorError> {
        let behavior = match name.to_ascii_lowercase().as_str() {
            "nth-child" => Self::Query(StrategyKind::NthChild),
            "nth-last-child" => Self::Query(StrategyKind::NthLastChild),
            "first-child" => Self::Query(StrategyKind::FirstChild),
            "last-child" => Self::Query(StrategyKind::LastChild),
            "only-child" => Self::Query(StrategyKind::OnlyChild),
            "empty" => Self::Query(StrategyKind::Empty),
            "root" => Self::Query(StrategyKind::Root),
            "has" => Self::Filter(FilterKind::Has),
            "not" => Self::Filter(FilterKind::Not),
            "lang" => Self::Filter(FilterKind::Lang),
            "visible" => Self::Filter(FilterKind::Visible),
            "hidden" => Self::Filter(FilterKind::Hidden),
            _ => return Err(SelectorError::UnsupportedPseudoClass(name.to_string())),
        };
        Ok(behavior)
    }
}

fn check_arity(
    name: &str,
    takes_argument: bool,
    condition: &Condition,
) -> Result<(), SelectorError> {
    match (&condition.argument, takes_argument) {
        (Some(_), true) | (None, false) => Ok(()),
        (None, true) => Err(SelectorError::Syntax {
            pseudo: name.to_string(),
            argument: String::new(),
            reason: format!(":{name}() requires an argument"),
        }),
        (Some(argument), false) => Err(SelectorError::Syntax {
            pseudo: name.to_string(),
            argument: argument.clone(),
            reason: format!(":{name} takes no argument, but was :{name}({argument})"),
        }),
    }
}
