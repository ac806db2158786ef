//! Compilation tests against a scripted engine.
//!
//! The stub only answers probes: it accepts the native expressions it was
//! built with and rejects everything else, counting every native query.

use std::cell::Cell;
use std::collections::HashSet;
use std::sync::Arc;

use quarry_selector::ast::Combinator;
use quarry_selector::{
    CompilerConfig, CssFilter, EngineError, Locator, NativeSupportCache, QueryEngine, QueryKind,
    SelectorCompiler, SelectorError,
};

struct StubEngine {
    capability: &'static str,
    native: HashSet<&'static str>,
    native_queries: Cell<usize>,
}

impl StubEngine {
    fn new(capability: &'static str, native: &[&'static str]) -> Self {
        Self {
            capability,
            native: native.iter().copied().collect(),
            native_queries: Cell::new(0),
        }
    }

    fn modern() -> Self {
        Self::new(
            "modern",
            &[
                ":nth-child(1)",
                ":nth-last-child(1)",
                ":first-child",
                ":last-child",
                ":only-child",
                ":empty",
                ":root",
            ],
        )
    }

    fn legacy() -> Self {
        Self::new("legacy", &[])
    }
}

impl QueryEngine for StubEngine {
    type Element = u32;

    fn document(&self) -> u32 {
        0
    }

    fn capability_id(&self) -> String {
        self.capability.to_string()
    }

    fn find_all(
        &self,
        _context: &u32,
        expression: &str,
        kind: QueryKind,
    ) -> Result<Vec<u32>, EngineError> {
        if kind == QueryKind::Path {
            return Ok(Vec::new());
        }
        self.native_queries.set(self.native_queries.get() + 1);
        if self.native.contains(expression) {
            Ok(Vec::new())
        } else {
            Err(EngineError::InvalidExpression {
                expression: expression.to_string(),
                reason: "unsupported".to_string(),
            })
        }
    }

    fn attribute(&self, _element: &u32, _name: &str) -> Result<Option<String>, EngineError> {
        Ok(None)
    }

    fn is_displayed(&self, _element: &u32) -> Result<bool, EngineError> {
        Ok(true)
    }

    fn tag_name(&self, _element: &u32) -> Result<String, EngineError> {
        Ok("div".to_string())
    }
}

fn locators(
    compiler: &SelectorCompiler,
    engine: &StubEngine,
    selector: &str,
) -> Vec<(Combinator, Locator)> {
    let compiled = compiler.compile(engine, selector).unwrap();
    compiled.branches()[0]
        .steps
        .iter()
        .map(|step| (step.combinator, step.locator.clone()))
        .collect()
}

#[test]
fn test_supported_pseudo_classes_stay_native() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    assert_eq!(
        locators(&compiler, &engine, "ul.menu > li:nth-child(2n+1)"),
        vec![
            (Combinator::Descendant, Locator::Native("ul.menu".to_string())),
            (Combinator::Child, Locator::Native("li:nth-child(2n+1)".to_string())),
        ]
    );
}

#[test]
fn test_unsupported_pseudo_classes_fall_back_to_path_queries() {
    let engine = StubEngine::legacy();
    let compiler = SelectorCompiler::default();
    assert_eq!(
        locators(&compiler, &engine, "ul > li:nth-child(2n+1)"),
        vec![
            (Combinator::Descendant, Locator::Native("ul".to_string())),
            (
                Combinator::Child,
                Locator::Path(
                    "./*[local-name() = 'li' and ((position() - 1) mod 2 = 0 and position() >= 1)]"
                        .to_string()
                )
            ),
        ]
    );
}

#[test]
fn test_descendant_path_step_searches_the_subtree() {
    let engine = StubEngine::legacy();
    let compiler = SelectorCompiler::default();
    assert_eq!(
        locators(&compiler, &engine, "p.note:last-child"),
        vec![(
            Combinator::Descendant,
            Locator::Path(
                ".//*[local-name() = 'p' and contains(concat(' ', normalize-space(@class), ' '), ' note ') \
                 and (position() = last())]"
                    .to_string()
            )
        )]
    );
}

#[test]
fn test_disabling_probing_forces_path_queries() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::new(CompilerConfig {
        native_probing: false,
        ..CompilerConfig::default()
    });
    assert_eq!(
        locators(&compiler, &engine, ":root"),
        vec![(Combinator::Descendant, Locator::Path(".//*[(not(parent::*))]".to_string()))]
    );
    assert_eq!(engine.native_queries.get(), 0);
}

#[test]
fn test_probe_runs_once_per_capability() {
    let cache = Arc::new(NativeSupportCache::new());
    let first = SelectorCompiler::with_cache(CompilerConfig::default(), Arc::clone(&cache));
    let second = SelectorCompiler::with_cache(CompilerConfig::default(), Arc::clone(&cache));
    let engine = StubEngine::modern();
    let same_capability = StubEngine::modern();

    for _ in 0..5 {
        let _ = first.compile(&engine, "li:nth-child(3)").unwrap();
        let _ = second.compile(&same_capability, "li:nth-child(2n)").unwrap();
    }

    assert_eq!(engine.native_queries.get(), 1);
    assert_eq!(same_capability.native_queries.get(), 0);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_failed_probe_is_cached_too() {
    let compiler = SelectorCompiler::default();
    let engine = StubEngine::legacy();
    let _ = compiler.compile(&engine, "li:empty").unwrap();
    let _ = compiler.compile(&engine, "p:empty, a:empty").unwrap();
    assert_eq!(engine.native_queries.get(), 1);
    assert_eq!(
        compiler.cache().get("legacy", quarry_selector::pseudo::StrategyKind::Empty),
        Some(false)
    );
}

#[test]
fn test_filter_only_compound_locates_everything() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    let compiled = compiler.compile(&engine, ":visible").unwrap();
    let step = &compiled.branches()[0].steps[0];
    assert_eq!(step.locator, Locator::Native("*".to_string()));
    assert!(matches!(step.filters.as_slice(), [CssFilter::Visible]));
}

#[test]
fn test_has_compiles_a_nested_relative_selector() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    let compiled = compiler.compile(&engine, "div:has(> p.lead, + span)").unwrap();
    let step = &compiled.branches()[0].steps[0];
    assert_eq!(step.locator, Locator::Native("div".to_string()));

    let [CssFilter::Has(nested)] = step.filters.as_slice() else {
        panic!("expected a single :has filter, got {:?}", step.filters);
    };
    let leading: Vec<(Combinator, Locator)> = nested
        .branches()
        .iter()
        .map(|branch| (branch.steps[0].combinator, branch.steps[0].locator.clone()))
        .collect();
    assert_eq!(
        leading,
        vec![
            (Combinator::Child, Locator::Native("p.lead".to_string())),
            (Combinator::NextSibling, Locator::Native("span".to_string())),
        ]
    );
}

#[test]
fn test_identifiers_and_values_are_escaped() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    assert_eq!(
        locators(&compiler, &engine, r#"#\31 abc[title="a\\b"]"#),
        vec![(
            Combinator::Descendant,
            Locator::Native(r#"#\31 abc[title="a\\b"]"#.to_string())
        )]
    );
}

#[test]
fn test_lang_filter_keeps_the_code() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    let compiled = compiler.compile(&engine, "p:lang(en)").unwrap();
    assert!(matches!(
        compiled.branches()[0].steps[0].filters.as_slice(),
        [CssFilter::Lang(code)] if code == "en"
    ));
}

#[test]
fn test_comma_branches_compile_independently() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    let compiled = compiler.compile(&engine, "h1, h2 + p").unwrap();
    assert_eq!(compiled.branches().len(), 2);
    assert_eq!(compiled.branches()[1].steps.len(), 2);
}

#[test]
fn test_unknown_pseudo_class_aborts_compilation() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    assert_eq!(
        compiler.compile(&engine, "a:hover").unwrap_err(),
        SelectorError::UnsupportedPseudoClass("hover".to_string())
    );
    assert!(matches!(
        compiler.compile(&engine, "div:has(a:hover)"),
        Err(SelectorError::UnsupportedPseudoClass(name)) if name == "hover"
    ));
}

#[test]
fn test_bad_arguments_abort_compilation() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    for (selector, pseudo) in [
        ("li:nth-child(odd)", "nth-child"),
        ("li:nth-last-child(2m+1)", "nth-last-child"),
        ("li:nth-child", "nth-child"),
        ("li:first-child(1)", "first-child"),
        ("p:lang()", "lang"),
        ("p:visible(yes)", "visible"),
    ] {
        match compiler.compile(&engine, selector) {
            Err(SelectorError::Syntax { pseudo: reported, .. }) => assert_eq!(reported, pseudo),
            other => panic!("{selector:?} should be a syntax error, got {other:?}"),
        }
    }
}

#[test]
fn test_nested_parse_errors_abort_compilation() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::default();
    assert!(matches!(
        compiler.compile(&engine, "div:has(p::before)"),
        Err(SelectorError::Parse { .. })
    ));
    assert!(matches!(
        compiler.compile(&engine, "div:not()"),
        Err(SelectorError::Parse { .. })
    ));
}

#[test]
fn test_nesting_depth_is_bounded() {
    let engine = StubEngine::modern();
    let compiler = SelectorCompiler::new(CompilerConfig {
        max_nesting_depth: 1,
        ..CompilerConfig::default()
    });
    assert!(compiler.compile(&engine, "a:has(b:not(.c))").is_err());
    assert!(compiler.compile(&engine, "a:has(b)").is_ok());
    assert_eq!(
        compiler.compile(&engine, "a:has(b:has(c))").unwrap_err(),
        SelectorError::NestingTooDeep { max: 1 }
    );
}
