//! Selector text to [`CompiledSelector`].
//!
//! Each compound becomes one [`PlanStep`]. Its query-expressible parts are
//! rendered twice, as CSS and as an `XPath` predicate; the CSS form is used
//! only when the engine natively evaluates every pseudo-class the compound
//! needs. Filter pseudo-classes are compiled into [`CssFilter`]s, nested
//! selectors included, so a bad `:has()` argument fails the whole compile.

use std::sync::Arc;

use log::debug;
use quarry_common::warning::warn_once;

use crate::ast::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Condition, SelectorList,
    SimpleSelector,
};
use crate::cache::NativeSupportCache;
use crate::config::CompilerConfig;
use crate::engine::{QueryEngine, QueryKind};
use crate::error::SelectorError;
use crate::escape::{escape_attribute_value, escape_selector, xpath_literal};
use crate::filter::CssFilter;
use crate::locator::Locator;
use crate::parser::{parse_relative_selector_list, parse_selector_list};
use crate::plan::{CompiledSelector, PlanStep, SelectorPlan};
use crate::pseudo::{Behavior, FilterKind, StrategyKind};

/// Compiles selector text against a particular engine.
///
/// Cheap to clone; clones share the native-support cache.
#[derive(Debug, Clone, Default)]
pub struct SelectorCompiler {
    config: CompilerConfig,
    cache: Arc<NativeSupportCache>,
}

impl SelectorCompiler {
    /// A compiler with its own, empty support cache.
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_cache(config, Arc::default())
    }

    /// A compiler sharing `cache` with other compilers.
    #[must_use]
    pub fn with_cache(config: CompilerConfig, cache: Arc<NativeSupportCache>) -> Self {
        Self { config, cache }
    }

    /// The active settings.
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// The native-support cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<NativeSupportCache> {
        &self.cache
    }

    /// Parse and compile `selector` for `engine`.
    ///
    /// ```
    /// # use quarry_selector::{CompilerConfig, SelectorCompiler, SelectorError};
    /// # fn demo<E: quarry_selector::QueryEngine>(engine: &E) -> Result<(), SelectorError> {
    /// let compiler = SelectorCompiler::new(CompilerConfig::default());
    /// let selector = compiler.compile(engine, "ul > li:nth-child(2n+1)")?;
    /// let items = selector.execute(engine, &engine.document())?;
    /// # let _ = items;
    /// # Ok(())
    /// # }
    /// ```
    pub fn compile<E: QueryEngine>(
        &self,
        engine: &E,
        selector: &str,
    ) -> Result<CompiledSelector, SelectorError> {
        let list = parse_selector_list(selector)?;
        let compiled = self.compile_list(engine, &list, 0)?;
        debug!("compiled `{selector}` into {} branch(es)", compiled.branches().len());
        Ok(compiled)
    }

    fn compile_list<E: QueryEngine>(
        &self,
        engine: &E,
        list: &SelectorList,
        depth: usize,
    ) -> Result<CompiledSelector, SelectorError> {
        if depth > self.config.max_nesting_depth {
            return Err(SelectorError::NestingTooDeep {
                max: self.config.max_nesting_depth,
            });
        }
        let branches = list
            .selectors
            .iter()
            .map(|complex| self.compile_complex(engine, complex, depth))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledSelector::new(branches))
    }

    fn compile_complex<E: QueryEngine>(
        &self,
        engine: &E,
        complex: &ComplexSelector,
        depth: usize,
    ) -> Result<SelectorPlan, SelectorError> {
        let steps = complex
            .steps
            .iter()
            .map(|(combinator, compound)| {
                self.compile_compound(engine, *combinator, compound, depth)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SelectorPlan { steps })
    }

    fn compile_compound<E: QueryEngine>(
        &self,
        engine: &E,
        combinator: Combinator,
        compound: &CompoundSelector,
        depth: usize,
    ) -> Result<PlanStep, SelectorError> {
        let mut type_name = None;
        let mut css = String::new();
        let mut predicates = Vec::new();
        let mut filters = Vec::new();
        let mut native = true;

        for simple in &compound.simple_selectors {
            match simple {
                SimpleSelector::Universal => {}
                SimpleSelector::Type(name) => {
                    type_name = Some(name.as_str());
                    predicates.push(format!("local-name() = {}", xpath_literal(name)));
                }
                SimpleSelector::Id(id) => {
                    css.push('#');
                    css.push_str(&escape_selector(id));
                    predicates.push(format!("@id = {}", xpath_literal(id)));
                }
                SimpleSelector::Class(class) => {
                    css.push('.');
                    css.push_str(&escape_selector(class));
                    predicates.push(word_predicate("@class", class));
                }
                SimpleSelector::Attribute(attribute) => {
                    css.push_str(&attribute_css(attribute));
                    predicates.push(attribute_predicate(attribute));
                }
                SimpleSelector::PseudoClass(condition) => {
                    match Behavior::resolve(&condition.name)? {
                        Behavior::Query(kind) => {
                            css.push_str(kind.native_query(condition)?.expression());
                            predicates
                                .push(format!("({})", kind.path_query(condition)?.expression()));
                            native &= self.supports_natively(engine, kind);
                        }
                        Behavior::Filter(kind) => {
                            filters.push(self.compile_filter(engine, kind, condition, depth)?);
                        }
                    }
                }
            }
        }

        let locator = if native {
            let css = match type_name {
                Some(name) => format!("{}{css}", escape_selector(name)),
                None if css.is_empty() => "*".to_string(),
                None => css,
            };
            Locator::Native(css)
        } else {
            let axis = match combinator {
                Combinator::Descendant => ".//*",
                _ => "./*",
            };
            if predicates.is_empty() {
                Locator::Path(axis.to_string())
            } else {
                Locator::Path(format!("{axis}[{}]", predicates.join(" and ")))
            }
        };
        debug!("{combinator:?} step: {locator} with {} filter(s)", filters.len());

        Ok(PlanStep {
            combinator,
            locator,
            filters,
        })
    }

    fn compile_filter<E: QueryEngine>(
        &self,
        engine: &E,
        kind: FilterKind,
        condition: &Condition,
        depth: usize,
    ) -> Result<CssFilter, SelectorError> {
        kind.check_argument(condition)?;
        let argument = condition.argument_text();
        let filter = match kind {
            FilterKind::Has => {
                let nested = parse_relative_selector_list(argument)?;
                CssFilter::Has(Box::new(self.compile_list(engine, &nested, depth + 1)?))
            }
            FilterKind::Not => {
                let nested = parse_selector_list(argument)?;
                CssFilter::Not(Box::new(self.compile_list(engine, &nested, depth + 1)?))
            }
            FilterKind::Lang => {
                let code = argument.trim().trim_matches(|c| c == '"' || c == '\'');
                if code.is_empty() {
                    return Err(SelectorError::Syntax {
                        pseudo: kind.name().to_string(),
                        argument: argument.to_string(),
                        reason: "the :lang() pseudo-class needs a language code".to_string(),
                    });
                }
                CssFilter::Lang(code.to_string())
            }
            FilterKind::Visible => CssFilter::Visible,
            FilterKind::Hidden => CssFilter::Hidden,
        };
        Ok(filter)
    }

    /// Whether the engine evaluates `kind` natively, probing once per
    /// capability id.
    fn supports_natively<E: QueryEngine>(&self, engine: &E, kind: StrategyKind) -> bool {
        if !self.config.native_probing {
            return false;
        }
        let capability = engine.capability_id();
        self.cache.get_or_probe(&capability, kind, || {
            match engine.find_all(&engine.document(), kind.probe_expression(), QueryKind::Native) {
                Ok(_) => {
                    debug!("{capability}: :{} is natively supported", kind.name());
                    true
                }
                Err(error) => {
                    debug!("{capability}: :{} is not natively supported: {error}", kind.name());
                    let _ = warn_once(
                        "selector",
                        &format!(
                            ":{} is not natively supported by {capability}; using path queries",
                            kind.name()
                        ),
                    );
                    false
                }
            }
        })
    }
}

/// `[name op "value"]`
fn attribute_css(attribute: &AttributeSelector) -> String {
    let name = escape_selector(attribute.name());
    let (operator, value) = match attribute {
        AttributeSelector::Exists(_) => return format!("[{name}]"),
        AttributeSelector::Equals(_, value) => ("=", value),
        AttributeSelector::Includes(_, value) => ("~=", value),
        AttributeSelector::DashMatch(_, value) => ("|=", value),
        AttributeSelector::PrefixMatch(_, value) => ("^=", value),
        AttributeSelector::SuffixMatch(_, value) => ("$=", value),
        AttributeSelector::SubstringMatch(_, value) => ("*=", value),
    };
    format!("[{name}{operator}{}]", escape_attribute_value(value))
}

fn attribute_predicate(attribute: &AttributeSelector) -> String {
    let attr = attribute_path(attribute.name());
    match attribute {
        AttributeSelector::Exists(_) => attr,
        AttributeSelector::Equals(_, value) => format!("{attr} = {}", xpath_literal(value)),
        AttributeSelector::Includes(_, value) => word_predicate(&attr, value),
        AttributeSelector::DashMatch(_, value) => format!(
            "({attr} = {} or starts-with({attr}, {}))",
            xpath_literal(value),
            xpath_literal(&format!("{value}-"))
        ),
        AttributeSelector::PrefixMatch(_, value) => {
            format!("starts-with({attr}, {})", xpath_literal(value))
        }
        AttributeSelector::SuffixMatch(_, value) => {
            let literal = xpath_literal(value);
            format!(
                "substring({attr}, string-length({attr}) - string-length({literal}) + 1) = {literal}"
            )
        }
        AttributeSelector::SubstringMatch(_, value) => {
            format!("contains({attr}, {})", xpath_literal(value))
        }
    }
}

/// `@name`, or a `name()` match when `name` is not an `XPath` `NCName`.
fn attribute_path(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if plain {
        format!("@{name}")
    } else {
        format!("@*[name() = {}]", xpath_literal(name))
    }
}

/// Whitespace-separated word match, the path form of `.class` and `[a~=v]`.
fn word_predicate(attribute: &str, word: &str) -> String {
    format!(
        "contains(concat(' ', normalize-space({attribute}), ' '), {})",
        xpath_literal(&format!(" {word} "))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_css() {
        assert_eq!(attribute_css(&AttributeSelector::Exists("href".into())), "[href]");
        assert_eq!(
            attribute_css(&AttributeSelector::PrefixMatch("href".into(), "http".into())),
            "[href^=\"http\"]"
        );
    }

    #[test]
    fn test_attribute_names_are_escaped() {
        assert_eq!(attribute_css(&AttributeSelector::Exists("data:x".into())), "[data\\:x]");
        assert_eq!(
            attribute_css(&AttributeSelector::Equals("1st".into(), "a".into())),
            "[\\31 st=\"a\"]"
        );
        assert_eq!(attribute_path("data-x"), "@data-x");
        assert_eq!(attribute_path("data:x"), "@*[name() = 'data:x']");
        assert_eq!(
            attribute_predicate(&AttributeSelector::Equals("data:x".into(), "1".into())),
            "@*[name() = 'data:x'] = '1'"
        );
    }

    #[test]
    fn test_attribute_predicates() {
        assert_eq!(
            attribute_predicate(&AttributeSelector::Equals("type".into(), "text".into())),
            "@type = 'text'"
        );
        assert_eq!(
            attribute_predicate(&AttributeSelector::DashMatch("lang".into(), "en".into())),
            "(@lang = 'en' or starts-with(@lang, 'en-'))"
        );
        assert_eq!(
            attribute_predicate(&AttributeSelector::SuffixMatch("src".into(), ".png".into())),
            "substring(@src, string-length(@src) - string-length('.png') + 1) = '.png'"
        );
        assert_eq!(
            word_predicate("@class", "item"),
            "contains(concat(' ', normalize-space(@class), ' '), ' item ')"
        );
    }
}
