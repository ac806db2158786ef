//! The condition tree produced by the selector parser.
//!
//! Types follow [Selectors Level 4](https://www.w3.org/TR/selectors-4/), trimmed
//! to what the locator compiler understands.

use std::fmt;

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Stored ASCII-lowercased. Examples: `div`, `p`, `span`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Examples: `.highlight`, `.btn`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Examples: `#main`, `#nav-bar`
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    ///
    /// Kept as name plus raw argument; the compiler decides how to locate it.
    PseudoClass(Condition),
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`
    Exists(String),
    /// `[attr=value]`
    Equals(String, String),
    /// `[attr~=value]`: whitespace-separated word match
    Includes(String, String),
    /// `[attr|=value]`: exact or `value-` prefix
    DashMatch(String, String),
    /// `[attr^=value]`
    PrefixMatch(String, String),
    /// `[attr$=value]`
    SuffixMatch(String, String),
    /// `[attr*=value]`
    SubstringMatch(String, String),
}

impl AttributeSelector {
    /// The attribute name the selector tests.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Exists(name)
            | Self::Equals(name, _)
            | Self::Includes(name, _)
            | Self::DashMatch(name, _)
            | Self::PrefixMatch(name, _)
            | Self::SuffixMatch(name, _)
            | Self::SubstringMatch(name, _) => name,
        }
    }
}

/// A pseudo-class occurrence: its name and raw argument text.
///
/// `argument` is `None` for `:first-child` and `Some("")` for `:nth-child()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    /// ASCII-lowercased name without the colon.
    pub name: String,
    /// Raw text between the parentheses, untrimmed.
    pub argument: Option<String>,
}

impl Condition {
    /// Create a condition.
    #[must_use]
    pub fn new(name: &str, argument: Option<&str>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            argument: argument.map(str::to_string),
        }
    }

    /// The argument text, or the empty string when there are no parentheses.
    #[must_use]
    pub fn argument_text(&self) -> &str {
        self.argument.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, ":{}({argument})", self.name),
            None => write!(f, ":{}", self.name),
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors, in source order.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Pseudo-class conditions of this compound, in source order.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.simple_selectors.iter().filter_map(|simple| match simple {
            SimpleSelector::PseudoClass(condition) => Some(condition),
            _ => None,
        })
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators) `A B`
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators) `A > B`
    Child,
    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators) `A + B`
    NextSibling,
    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators) `A ~ B`
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Stored left to right, the order in which a locator plan executes. Each
/// compound carries the combinator that relates it to the previous one; the
/// first compound's combinator relates it to the search root and is
/// `Descendant` unless the selector is relative (`:has(> p)`).
///
/// Example: `div.nav > li a`
/// ```text
/// [(Descendant, div.nav), (Child, li), (Descendant, a)]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// `(combinator, compound)` pairs, leftmost first. Never empty.
    pub steps: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// The rightmost compound: the elements the selector represents.
    #[must_use]
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.steps.last().map(|(_, compound)| compound)
    }
}

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// Comma-separated complex selectors, in source order.
    pub selectors: Vec<ComplexSelector>,
}
