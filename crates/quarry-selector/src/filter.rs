//! In-process predicates for pseudo-classes no query language can express.
//!
//! Filters narrow the elements a plan step located. They only read the
//! engine, so several filters on one compound compose with AND in any order.

use crate::engine::QueryEngine;
use crate::error::SelectorError;
use crate::plan::CompiledSelector;
use crate::traversal;

/// A compiled pseudo-class filter.
#[derive(Debug, Clone)]
pub enum CssFilter {
    /// `:has(...)`: the nested selector, rooted at the candidate, matches
    /// something.
    Has(Box<CompiledSelector>),
    /// `:not(...)`: the candidate is not among the nested selector's matches
    /// from the document.
    Not(Box<CompiledSelector>),
    /// `:lang(code)`: the inherited language is `code` or a `code-` subtag.
    Lang(String),
    /// `:visible`
    Visible,
    /// `:hidden`
    Hidden,
}

impl CssFilter {
    /// Whether `element` passes the filter.
    pub fn matches<E: QueryEngine>(
        &self,
        engine: &E,
        element: &E::Element,
    ) -> Result<bool, SelectorError> {
        match self {
            Self::Has(nested) => Ok(!nested.execute(engine, element)?.is_empty()),
            Self::Not(nested) => {
                let excluded = nested.execute(engine, &engine.document())?;
                Ok(!excluded.contains(element))
            }
            Self::Lang(code) => Ok(traversal::lang(engine, element)?
                .is_some_and(|lang| lang_matches(&lang, code))),
            Self::Visible => Ok(traversal::is_visible(engine, element)?),
            Self::Hidden => Ok(!traversal::is_visible(engine, element)?),
        }
    }
}

/// Whether `element` passes every filter. Stops at the first rejection.
pub fn matches_all<E: QueryEngine>(
    filters: &[CssFilter],
    engine: &E,
    element: &E::Element,
) -> Result<bool, SelectorError> {
    for filter in filters {
        if !filter.matches(engine, element)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo):
/// exact match or a hyphen-separated prefix, ASCII case-insensitive.
fn lang_matches(lang: &str, code: &str) -> bool {
    let lang = lang.trim();
    if lang.eq_ignore_ascii_case(code) {
        return true;
    }
    lang.len() > code.len()
        && lang.is_char_boundary(code.len())
        && lang[..code.len()].eq_ignore_ascii_case(code)
        && lang[code.len()..].starts_with('-')
}
