//! Integration tests for selector text parsing.

use quarry_selector::ast::{AttributeSelector, Combinator, Condition, SimpleSelector};
use quarry_selector::{SelectorError, parse_relative_selector_list, parse_selector_list};

#[test]
fn test_parse_compound_selector() {
    let list = parse_selector_list("DIV.nav#main[data-x]").unwrap();
    assert_eq!(list.selectors.len(), 1);
    let steps = &list.selectors[0].steps;
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].0, Combinator::Descendant);
    assert_eq!(
        steps[0].1.simple_selectors,
        vec![
            SimpleSelector::Type("div".to_string()),
            SimpleSelector::Class("nav".to_string()),
            SimpleSelector::Id("main".to_string()),
            SimpleSelector::Attribute(AttributeSelector::Exists("data-x".to_string())),
        ]
    );
}

// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)

#[test]
fn test_parse_combinators() {
    let list = parse_selector_list("ul > li + li ~ p a").unwrap();
    let combinators: Vec<Combinator> = list.selectors[0].steps.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        combinators,
        vec![
            Combinator::Descendant,
            Combinator::Child,
            Combinator::NextSibling,
            Combinator::SubsequentSibling,
            Combinator::Descendant,
        ]
    );
}

#[test]
fn test_combinators_without_whitespace() {
    let list = parse_selector_list("ul>li+li").unwrap();
    assert_eq!(list.selectors[0].steps.len(), 3);
    assert_eq!(list.selectors[0].steps[1].0, Combinator::Child);
}

#[test]
fn test_parse_selector_list_splits_top_level_commas_only() {
    let list = parse_selector_list("p, div:has(a, b), [title='x,y']").unwrap();
    assert_eq!(list.selectors.len(), 3);

    let subject = list.selectors[1].subject().unwrap();
    let conditions: Vec<&Condition> = subject.conditions().collect();
    assert_eq!(conditions, vec![&Condition::new("has", Some("a, b"))]);
}

#[test]
fn test_pseudo_class_arguments_are_raw() {
    let list = parse_selector_list("li:NTH-CHILD( 2n + 1 ):first-child").unwrap();
    let conditions: Vec<&Condition> = list.selectors[0].steps[0].1.conditions().collect();
    assert_eq!(conditions[0].name, "nth-child");
    assert_eq!(conditions[0].argument.as_deref(), Some(" 2n + 1 "));
    assert_eq!(conditions[1], &Condition::new("first-child", None));
}

#[test]
fn test_nested_parentheses_in_arguments() {
    let list = parse_selector_list("div:has(p:not(.a))").unwrap();
    let conditions: Vec<&Condition> = list.selectors[0].steps[0].1.conditions().collect();
    assert_eq!(conditions[0].argument.as_deref(), Some("p:not(.a)"));
}

// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)

#[test]
fn test_parse_attribute_operators() {
    let list = parse_selector_list(
        r#"[a=b][c~="d e"][f|=en][g^='h'][i$=.png][j*=k]"#,
    )
    .unwrap();
    assert_eq!(
        list.selectors[0].steps[0].1.simple_selectors,
        vec![
            SimpleSelector::Attribute(AttributeSelector::Equals("a".into(), "b".into())),
            SimpleSelector::Attribute(AttributeSelector::Includes("c".into(), "d e".into())),
            SimpleSelector::Attribute(AttributeSelector::DashMatch("f".into(), "en".into())),
            SimpleSelector::Attribute(AttributeSelector::PrefixMatch("g".into(), "h".into())),
            SimpleSelector::Attribute(AttributeSelector::SuffixMatch("i".into(), ".png".into())),
            SimpleSelector::Attribute(AttributeSelector::SubstringMatch("j".into(), "k".into())),
        ]
    );
}

#[test]
fn test_quoted_attribute_value_escapes() {
    let list = parse_selector_list(r#"[title="say \"hi\""]"#).unwrap();
    assert_eq!(
        list.selectors[0].steps[0].1.simple_selectors[0],
        SimpleSelector::Attribute(AttributeSelector::Equals("title".into(), "say \"hi\"".into()))
    );
}

#[test]
fn test_escaped_identifiers() {
    let list = parse_selector_list(r"#\31 abc .a\:b").unwrap();
    let steps = &list.selectors[0].steps;
    assert_eq!(steps[0].1.simple_selectors[0], SimpleSelector::Id("1abc".into()));
    assert_eq!(steps[1].1.simple_selectors[0], SimpleSelector::Class("a:b".into()));
}

#[test]
fn test_relative_selector_list() {
    let list = parse_relative_selector_list("> p, + span, em").unwrap();
    let leading: Vec<Combinator> = list.selectors.iter().map(|s| s.steps[0].0).collect();
    assert_eq!(
        leading,
        vec![Combinator::Child, Combinator::NextSibling, Combinator::Descendant]
    );
}

#[test]
fn test_malformed_selectors_are_parse_errors() {
    for selector in [
        "",
        "   ",
        "> p",
        "p >",
        "a > > b",
        "p::before",
        "div:nth-child(2",
        "[href",
        "[href^]",
        ".",
        "#",
        "p, ",
        "p!",
    ] {
        assert!(
            matches!(parse_selector_list(selector), Err(SelectorError::Parse { .. })),
            "{selector:?} should not parse"
        );
    }
}

#[test]
fn test_type_selector_must_come_first() {
    assert!(matches!(
        parse_selector_list(".a div"),
        Ok(list) if list.selectors[0].steps.len() == 2
    ));
    assert!(matches!(
        parse_selector_list("[x]div"),
        Err(SelectorError::Parse { .. })
    ));
}
