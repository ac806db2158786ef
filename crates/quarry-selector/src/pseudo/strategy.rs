//! Query-expressible pseudo-classes.

use crate::ast::Condition;
use crate::error::SelectorError;
use crate::locator::Locator;
use crate::nth::NthArgument;

/// Position counted from the last sibling, for `:nth-last-child`.
const POSITION_FROM_END: &str = "(last() - position() + 1)";

/// Pseudo-classes with both a native and a path-query translation.
///
/// Each kind is a stateless strategy: a probe expression that tells whether
/// the engine evaluates the pseudo-class natively, and the two translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// [§ 14.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild,
    /// [§ 14.2 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild,
    /// [§ 14.3 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.4 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.5 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 13.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    Empty,
    /// [§ 13.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    Root,
}

impl StrategyKind {
    /// Name as written after the colon.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NthChild => "nth-child",
            Self::NthLastChild => "nth-last-child",
            Self::FirstChild => "first-child",
            Self::LastChild => "last-child",
            Self::OnlyChild => "only-child",
            Self::Empty => "empty",
            Self::Root => "root",
        }
    }

    /// Minimal native query used once to test engine support.
    #[must_use]
    pub const fn probe_expression(self) -> &'static str {
        match self {
            Self::NthChild => ":nth-child(1)",
            Self::NthLastChild => ":nth-last-child(1)",
            Self::FirstChild => ":first-child",
            Self::LastChild => ":last-child",
            Self::OnlyChild => ":only-child",
            Self::Empty => ":empty",
            Self::Root => ":root",
        }
    }

    const fn takes_argument(self) -> bool {
        matches!(self, Self::NthChild | Self::NthLastChild)
    }

    /// Reject a missing or unexpected argument.
    pub fn check_argument(self, condition: &Condition) -> Result<(), SelectorError> {
        super::check_arity(self.name(), self.takes_argument(), condition)
    }

    /// Native-query fragment for the condition.
    pub fn native_query(self, condition: &Condition) -> Result<Locator, SelectorError> {
        self.check_argument(condition)?;
        let css = match self {
            Self::NthChild | Self::NthLastChild => self
                .nth_argument(condition)?
                .to_native_query_for(self.name()),
            _ => format!(":{}", self.name()),
        };
        Ok(Locator::Native(css))
    }

    /// Path-query predicate for the condition, evaluated on the child axis.
    pub fn path_query(self, condition: &Condition) -> Result<Locator, SelectorError> {
        self.check_argument(condition)?;
        let xpath = match self {
            Self::NthChild => self.nth_argument(condition)?.to_path_query(),
            Self::NthLastChild => self
                .nth_argument(condition)?
                .to_path_query_at(POSITION_FROM_END),
            Self::FirstChild => "position() = 1".to_string(),
            Self::LastChild => "position() = last()".to_string(),
            Self::OnlyChild => "last() = 1".to_string(),
            Self::Empty => "not(*) and not(text())".to_string(),
            Self::Root => "not(parent::*)".to_string(),
        };
        Ok(Locator::Path(xpath))
    }

    fn nth_argument(self, condition: &Condition) -> Result<NthArgument, SelectorError> {
        NthArgument::parse_for(self.name(), condition.argument_text())
    }
}
