//! Compiled query expressions.

use std::fmt;

use crate::engine::QueryKind;

/// A query expression tagged with the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS evaluated by the engine.
    Native(String),
    /// `XPath` 1.0.
    Path(String),
}

impl Locator {
    /// The expression language.
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        match self {
            Self::Native(_) => QueryKind::Native,
            Self::Path(_) => QueryKind::Path,
        }
    }

    /// The expression text.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Native(expression) | Self::Path(expression) => expression,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(css) => write!(f, "css {css}"),
            Self::Path(xpath) => write!(f, "xpath {xpath}"),
        }
    }
}
