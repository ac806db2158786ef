//! Tests for the `XPath` evaluator against a small document.

use quarry_dom::{DomTree, NodeId};
use quarry_engine::xpath::{Evaluator, Value, XPathError, evaluate, select};

struct Page {
    tree: DomTree,
    html: NodeId,
    list: NodeId,
    items: [NodeId; 3],
    note: NodeId,
    empty: NodeId,
}

/// html > body > (ul#list > li*3, p.note, span)
fn page() -> Page {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[("lang", "en")]);
    let body = tree.append_element(html, "body", &[]);
    let list = tree.append_element(body, "ul", &[("id", "list")]);
    let mut items = [NodeId::ROOT; 3];
    for (index, text) in ["one", "two", "three"].into_iter().enumerate() {
        let class = if index == 1 { "item sel" } else { "item" };
        items[index] = tree.append_element(list, "li", &[("class", class)]);
        let _ = tree.append_text(items[index], text);
    }
    let note = tree.append_element(body, "p", &[("class", "note")]);
    let _ = tree.append_text(note, "  spaced   out ");
    let empty = tree.append_element(body, "span", &[]);
    Page {
        tree,
        html,
        list,
        items,
        note,
        empty,
    }
}

fn nodes(page: &Page, context: NodeId, expression: &str) -> Vec<NodeId> {
    let order = page.tree.document_order();
    select(&Evaluator::new(&page.tree, &order), context, expression).unwrap()
}

fn value(page: &Page, expression: &str) -> Value {
    evaluate(&page.tree, NodeId::ROOT, expression).unwrap()
}

#[test]
fn test_descendant_and_child_paths() {
    let page = page();
    assert_eq!(nodes(&page, NodeId::ROOT, "//li"), page.items.to_vec());
    assert_eq!(nodes(&page, NodeId::ROOT, "/html/body/ul"), vec![page.list]);
    assert_eq!(nodes(&page, page.list, "./*"), page.items.to_vec());
    assert_eq!(nodes(&page, page.list, ".//*"), page.items.to_vec());
    assert!(nodes(&page, NodeId::ROOT, "//table").is_empty());
}

#[test]
fn test_positions_are_relative_to_the_parent() {
    let page = page();
    assert_eq!(nodes(&page, NodeId::ROOT, "//li[2]"), vec![page.items[1]]);
    assert_eq!(nodes(&page, NodeId::ROOT, "//li[last()]"), vec![page.items[2]]);
    assert_eq!(nodes(&page, NodeId::ROOT, ".//*[position() = 1]").first(), Some(&page.html));
    assert_eq!(
        nodes(&page, NodeId::ROOT, "//li[(position() - 1) mod 2 = 0 and position() >= 1]"),
        vec![page.items[0], page.items[2]]
    );
    assert_eq!(
        nodes(&page, NodeId::ROOT, "//li[(last() - position() + 1) = 1]"),
        vec![page.items[2]]
    );
}

#[test]
fn test_filter_expression_positions_follow_document_order() {
    let page = page();
    assert_eq!(nodes(&page, NodeId::ROOT, "(//body/*)[2]"), vec![page.note]);
}

#[test]
fn test_reverse_axes_count_nearest_first() {
    let page = page();
    assert_eq!(
        nodes(&page, page.items[2], "preceding-sibling::*[1]"),
        vec![page.items[1]]
    );
    assert_eq!(nodes(&page, page.items[0], "ancestor::*[2]").len(), 1);
    assert_eq!(nodes(&page, page.items[0], "ancestor::*[last()]"), vec![page.html]);
    assert_eq!(nodes(&page, page.items[0], ".."), vec![page.list]);
}

#[test]
fn test_parent_of_the_document_element_is_the_document() {
    let page = page();
    assert_eq!(nodes(&page, page.html, ".."), vec![NodeId::ROOT]);
    assert!(nodes(&page, page.html, "parent::*").is_empty());
}

#[test]
fn test_union_is_sorted_and_deduplicated() {
    let page = page();
    assert_eq!(
        nodes(&page, NodeId::ROOT, "//span | //li[1] | //li"),
        vec![page.items[0], page.items[1], page.items[2], page.empty]
    );
}

#[test]
fn test_class_word_match() {
    let page = page();
    assert_eq!(
        nodes(
            &page,
            NodeId::ROOT,
            "//*[contains(concat(' ', normalize-space(@class), ' '), ' sel ')]"
        ),
        vec![page.items[1]]
    );
}

#[test]
fn test_node_set_comparisons() {
    let page = page();
    assert_eq!(nodes(&page, NodeId::ROOT, "//li[. = 'three']"), vec![page.items[2]]);
    assert_eq!(value(&page, "//li = 'two'"), Value::Boolean(true));
    assert_eq!(value(&page, "//li != 'two'"), Value::Boolean(true));
    assert_eq!(value(&page, "//table = 'two'"), Value::Boolean(false));
    assert_eq!(value(&page, "count(//li) > 2"), Value::Boolean(true));
}

#[test]
fn test_attributes() {
    let page = page();
    assert_eq!(value(&page, "string(//ul/@id)"), Value::String("list".to_string()));
    assert_eq!(nodes(&page, NodeId::ROOT, "//*[@lang]"), vec![page.html]);
    assert_eq!(nodes(&page, NodeId::ROOT, "//*[@id = 'list']"), vec![page.list]);
    assert_eq!(
        nodes(&page, NodeId::ROOT, "//*[starts-with(@class, 'item ')]"),
        vec![page.items[1]]
    );
}

#[test]
fn test_string_functions() {
    let page = page();
    assert_eq!(value(&page, "normalize-space(//p)"), Value::String("spaced out".to_string()));
    assert_eq!(value(&page, "concat('a', 'b', 'c')"), Value::String("abc".to_string()));
    assert_eq!(value(&page, "string-length('abc')"), Value::Number(3.0));
    assert_eq!(value(&page, "substring('12345', 2, 3)"), Value::String("234".to_string()));
    assert_eq!(value(&page, "local-name(//ul)"), Value::String("ul".to_string()));
    assert_eq!(value(&page, "contains('selector', 'lect')"), Value::Boolean(true));
}

#[test]
fn test_arithmetic() {
    let page = page();
    assert_eq!(value(&page, "7 mod 3"), Value::Number(1.0));
    assert_eq!(value(&page, "-7 mod 3"), Value::Number(-1.0));
    assert_eq!(value(&page, "10 div 4"), Value::Number(2.5));
    assert_eq!(value(&page, "1 div 0"), Value::Number(f64::INFINITY));
    assert_eq!(value(&page, "2 + 3 * 4"), Value::Number(14.0));
}

#[test]
fn test_empty_and_text_tests() {
    let page = page();
    assert_eq!(
        nodes(&page, NodeId::ROOT, "//body/*[not(*) and not(text())]"),
        vec![page.empty]
    );
    assert_eq!(value(&page, "count(//li/text())"), Value::Number(3.0));
    assert_eq!(value(&page, "not(//table)"), Value::Boolean(true));
}

#[test]
fn test_errors() {
    let page = page();
    let evaluate = |expression| evaluate(&page.tree, NodeId::ROOT, expression);

    assert!(matches!(evaluate("//li["), Err(XPathError::Syntax(_))));
    assert_eq!(
        evaluate("bogus()"),
        Err(XPathError::UnknownFunction("bogus".to_string()))
    );
    assert_eq!(evaluate("count(1)"), Err(XPathError::NotANodeSet));
    assert!(matches!(evaluate("following::li"), Err(XPathError::UnsupportedAxis(_))));
    assert!(matches!(evaluate("position(1)"), Err(XPathError::Arity { .. })));
    assert!(matches!(
        evaluate("'open"),
        Err(XPathError::UnterminatedLiteral { offset: 0 })
    ));

    let order = page.tree.document_order();
    assert_eq!(
        select(&Evaluator::new(&page.tree, &order), NodeId::ROOT, "1 + 1"),
        Err(XPathError::NotANodeSet)
    );
}
