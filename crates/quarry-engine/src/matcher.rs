//! Native CSS evaluation over a [`DomTree`].
//!
//! [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
//!
//! Selectors are parsed with the compiler's own parser, then every pseudo-class
//! is checked against the engine's capability set before anything is matched,
//! so an unsupported pseudo-class fails the whole query the way a browser
//! rejects an invalid selector.

use std::collections::HashSet;

use quarry_dom::{DomTree, NodeId, NodeType};
use quarry_selector::ast::{AttributeSelector, Combinator, SelectorList, SimpleSelector};
use quarry_selector::pseudo::{Behavior, StrategyKind};
use quarry_selector::{EngineError, NthArgument, parse_selector_list};

/// A structural pseudo-class with its argument already parsed.
#[derive(Debug, Clone, Copy)]
enum Structural {
    Nth(NthArgument),
    NthLast(NthArgument),
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
}

/// A simple selector ready to test.
enum Test<'s> {
    Simple(&'s SimpleSelector),
    Structural(Structural),
}

type Compound<'s> = Vec<Test<'s>>;

/// A complex selector, leftmost compound first.
type Complex<'s> = Vec<(Combinator, Compound<'s>)>;

/// Elements below `context` matching the CSS selector list, in document order.
pub fn select(
    tree: &DomTree,
    native: &HashSet<StrategyKind>,
    context: NodeId,
    css: &str,
) -> Result<Vec<NodeId>, EngineError> {
    let list = parse_selector_list(css).map_err(|error| invalid(css, error.to_string()))?;
    let selectors = prepare(&list, native, css)?;

    Ok(tree
        .descendants(context)
        .filter(|&id| tree.as_element(id).is_some())
        .filter(|&id| {
            selectors.iter().any(|complex| {
                complex
                    .len()
                    .checked_sub(1)
                    .is_some_and(|subject| matches_from(tree, complex, subject, id))
            })
        })
        .collect())
}

fn prepare<'s>(
    list: &'s SelectorList,
    native: &HashSet<StrategyKind>,
    css: &str,
) -> Result<Vec<Complex<'s>>, EngineError> {
    list.selectors
        .iter()
        .map(|complex| {
            complex
                .steps
                .iter()
                .map(|(combinator, compound)| {
                    let tests = compound
                        .simple_selectors
                        .iter()
                        .map(|simple| match simple {
                            SimpleSelector::PseudoClass(condition) => {
                                let kind = match Behavior::resolve(&condition.name) {
                                    Ok(Behavior::Query(kind)) if native.contains(&kind) => kind,
                                    _ => {
                                        return Err(invalid(
                                            css,
                                            format!("unsupported pseudo-class {condition}"),
                                        ));
                                    }
                                };
                                kind.check_argument(condition)
                                    .map_err(|error| invalid(css, error.to_string()))?;
                                let nth = || {
                                    NthArgument::parse_for(kind.name(), condition.argument_text())
                                        .map_err(|error| invalid(css, error.to_string()))
                                };
                                let structural = match kind {
                                    StrategyKind::NthChild => Structural::Nth(nth()?),
                                    StrategyKind::NthLastChild => Structural::NthLast(nth()?),
                                    StrategyKind::FirstChild => Structural::FirstChild,
                                    StrategyKind::LastChild => Structural::LastChild,
                                    StrategyKind::OnlyChild => Structural::OnlyChild,
                                    StrategyKind::Empty => Structural::Empty,
                                    StrategyKind::Root => Structural::Root,
                                };
                                Ok(Test::Structural(structural))
                            }
                            other => Ok(Test::Simple(other)),
                        })
                        .collect::<Result<Compound<'s>, _>>()?;
                    Ok((*combinator, tests))
                })
                .collect()
        })
        .collect()
}

fn invalid(css: &str, reason: String) -> EngineError {
    EngineError::InvalidExpression {
        expression: css.to_string(),
        reason,
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// Match compound `index` against `node`, then walk outward (right to left)
/// through the combinators, backtracking over every candidate ancestor or
/// sibling.
fn matches_from(tree: &DomTree, complex: &Complex<'_>, index: usize, node: NodeId) -> bool {
    let (combinator, compound) = &complex[index];
    if !compound_matches(tree, compound, node) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match combinator {
        // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
        Combinator::Descendant => tree
            .ancestors(node)
            .any(|ancestor| matches_from(tree, complex, index - 1, ancestor)),

        // [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
        Combinator::Child => tree
            .parent(node)
            .is_some_and(|parent| matches_from(tree, complex, index - 1, parent)),

        // [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
        Combinator::NextSibling => tree
            .preceding_siblings(node)
            .find(|&sibling| tree.as_element(sibling).is_some())
            .is_some_and(|sibling| matches_from(tree, complex, index - 1, sibling)),

        // [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
        Combinator::SubsequentSibling => tree
            .preceding_siblings(node)
            .filter(|&sibling| tree.as_element(sibling).is_some())
            .any(|sibling| matches_from(tree, complex, index - 1, sibling)),
    }
}

fn compound_matches(tree: &DomTree, compound: &Compound<'_>, node: NodeId) -> bool {
    if tree.as_element(node).is_none() {
        return false;
    }
    compound.iter().all(|test| match test {
        Test::Simple(simple) => simple_matches(tree, simple, node),
        Test::Structural(structural) => structural_matches(tree, *structural, node),
    })
}

fn simple_matches(tree: &DomTree, simple: &SimpleSelector, node: NodeId) -> bool {
    let Some(element) = tree.as_element(node) else {
        return false;
    };
    match simple {
        SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
        SimpleSelector::Class(class) => element.classes().contains(class.as_str()),
        SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
        SimpleSelector::Universal => true,
        // Rejected while preparing.
        SimpleSelector::PseudoClass(_) => false,
        SimpleSelector::Attribute(attribute) => {
            let Some(value) = element.attr(attribute.name()) else {
                return false;
            };
            match attribute {
                AttributeSelector::Exists(_) => true,
                AttributeSelector::Equals(_, wanted) => value == wanted,
                AttributeSelector::Includes(_, wanted) => {
                    value.split_ascii_whitespace().any(|word| word == wanted)
                }
                AttributeSelector::DashMatch(_, wanted) => {
                    value == wanted
                        || value
                            .strip_prefix(wanted.as_str())
                            .is_some_and(|rest| rest.starts_with('-'))
                }
                AttributeSelector::PrefixMatch(_, wanted) => {
                    !wanted.is_empty() && value.starts_with(wanted.as_str())
                }
                AttributeSelector::SuffixMatch(_, wanted) => {
                    !wanted.is_empty() && value.ends_with(wanted.as_str())
                }
                AttributeSelector::SubstringMatch(_, wanted) => {
                    !wanted.is_empty() && value.contains(wanted.as_str())
                }
            }
        }
    }
}

/// [§ 14 Tree-Structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)
fn structural_matches(tree: &DomTree, structural: Structural, node: NodeId) -> bool {
    if let Structural::Root = structural {
        return tree.document_element() == Some(node);
    }
    if let Structural::Empty = structural {
        // Comments don't count; any text does.
        return tree.children(node).iter().all(|&child| {
            tree.get(child)
                .is_some_and(|child| matches!(child.node_type, NodeType::Comment(_)))
        });
    }

    let Some(parent) = tree.parent(node) else {
        return false;
    };
    let siblings: Vec<NodeId> = tree.element_children(parent).collect();
    let Some(index) = siblings.iter().position(|&sibling| sibling == node) else {
        return false;
    };
    let position = i64::try_from(index + 1).unwrap_or(i64::MAX);
    let from_end = i64::try_from(siblings.len() - index).unwrap_or(i64::MAX);

    match structural {
        Structural::Nth(argument) => argument.matches(position),
        Structural::NthLast(argument) => argument.matches(from_end),
        Structural::FirstChild => position == 1,
        Structural::LastChild => from_end == 1,
        Structural::OnlyChild => siblings.len() == 1,
        Structural::Root | Structural::Empty => false,
    }
}
