//! Selector text parsing.
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! A small hand-written parser producing the [`SelectorList`] condition tree.
//! Pseudo-class arguments are not interpreted here: they are captured as raw
//! text (balanced parentheses, quotes respected) and handed to the compiler,
//! which knows each pseudo-class's argument grammar.

use std::iter::Peekable;
use std::mem;
use std::str::Chars;

use crate::ast::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Condition, SelectorList,
    SimpleSelector,
};
use crate::error::SelectorError;

type Input<'a> = Peekable<Chars<'a>>;

/// Parse a selector list such as `ul > li:nth-child(2n+1), p.note`.
pub fn parse_selector_list(selector: &str) -> Result<SelectorList, SelectorError> {
    parse_list(selector, false)
}

/// Parse a relative selector list, the argument form of `:has()`.
///
/// Identical to [`parse_selector_list`] except that each complex selector may
/// start with a combinator (`> p`, `+ li`), relating its first compound to the
/// element the list is evaluated from.
pub fn parse_relative_selector_list(selector: &str) -> Result<SelectorList, SelectorError> {
    parse_list(selector, true)
}

fn parse_list(selector: &str, relative: bool) -> Result<SelectorList, SelectorError> {
    if selector.trim().is_empty() {
        return Err(SelectorError::parse(selector, "empty selector"));
    }

    let selectors = split_top_level_commas(selector)
        .into_iter()
        .map(|part| parse_complex(selector, part, relative))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SelectorList { selectors })
}

/// Split on commas that are not nested in parentheses, brackets or strings.
fn split_top_level_commas(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (index, c) in selector.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (c, quote) {
            ('\\', _) => escaped = true,
            (_, Some(q)) if c == q => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('(' | '[', None) => depth += 1,
            (')' | ']', None) => depth = depth.saturating_sub(1),
            (',', None) if depth == 0 => {
                parts.push(&selector[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
fn parse_complex(
    source: &str,
    text: &str,
    relative: bool,
) -> Result<ComplexSelector, SelectorError> {
    let mut chars = text.trim().chars().peekable();
    let mut steps: Vec<(Combinator, CompoundSelector)> = Vec::new();
    let mut compound: Vec<SimpleSelector> = Vec::new();
    // Combinator relating the next compound to the previous one.
    let mut pending = Combinator::Descendant;
    let mut explicit_combinator = false;

    let flush = |compound: &mut Vec<SimpleSelector>,
                 steps: &mut Vec<(Combinator, CompoundSelector)>,
                 pending: &mut Combinator,
                 explicit: &mut bool| {
        if compound.is_empty() {
            return;
        }
        steps.push((
            *pending,
            CompoundSelector {
                simple_selectors: mem::take(compound),
            },
        ));
        *pending = Combinator::Descendant;
        *explicit = false;
    };

    while let Some(&c) = chars.peek() {
        match c {
            // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
            // Whitespace ends the compound; an explicit combinator may follow.
            c if c.is_whitespace() => {
                let _ = chars.next();
                flush(&mut compound, &mut steps, &mut pending, &mut explicit_combinator);
            }

            // [§ 16.2-16.4](https://www.w3.org/TR/selectors-4/#combinators)
            '>' | '+' | '~' => {
                let _ = chars.next();
                flush(&mut compound, &mut steps, &mut pending, &mut explicit_combinator);
                if explicit_combinator {
                    return Err(SelectorError::parse(source, "two combinators in a row"));
                }
                if steps.is_empty() && !relative {
                    return Err(SelectorError::parse(
                        source,
                        format!("combinator `{c}` without a left-hand side"),
                    ));
                }
                pending = match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::NextSibling,
                    _ => Combinator::SubsequentSibling,
                };
                explicit_combinator = true;
            }

            // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
            '*' => {
                let _ = chars.next();
                compound.push(SimpleSelector::Universal);
            }

            // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
            '.' => {
                let _ = chars.next();
                let name = consume_ident(&mut chars)
                    .ok_or_else(|| {
                        SelectorError::parse(source, "expected a class name after `.`")
                    })?;
                compound.push(SimpleSelector::Class(name));
            }

            // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
            '#' => {
                let _ = chars.next();
                let name = consume_ident(&mut chars)
                    .ok_or_else(|| SelectorError::parse(source, "expected an id after `#`"))?;
                compound.push(SimpleSelector::Id(name));
            }

            // [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
            '[' => {
                let _ = chars.next();
                compound.push(SimpleSelector::Attribute(parse_attribute(source, &mut chars)?));
            }

            // [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
            ':' => {
                let _ = chars.next();
                compound.push(SimpleSelector::PseudoClass(parse_pseudo_class(
                    source, &mut chars,
                )?));
            }

            // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
            c if is_ident_start_char(c) || c == '-' || c == '\\' => {
                if !compound.is_empty() {
                    return Err(SelectorError::parse(
                        source,
                        "a type selector must come first in its compound",
                    ));
                }
                let name = consume_ident(&mut chars)
                    .ok_or_else(|| SelectorError::parse(source, "expected a type selector"))?;
                compound.push(SimpleSelector::Type(name.to_ascii_lowercase()));
            }

            _ => {
                return Err(SelectorError::parse(
                    source,
                    format!("unexpected character `{c}`"),
                ));
            }
        }
    }

    flush(&mut compound, &mut steps, &mut pending, &mut explicit_combinator);

    if explicit_combinator {
        return Err(SelectorError::parse(source, "selector ends with a combinator"));
    }
    if steps.is_empty() {
        return Err(SelectorError::parse(source, "empty compound selector"));
    }

    Ok(ComplexSelector { steps })
}

/// Parse the inside of `[...]`; the opening bracket is already consumed.
fn parse_attribute(
    source: &str,
    chars: &mut Input<'_>,
) -> Result<AttributeSelector, SelectorError> {
    skip_whitespace(chars);
    let name = consume_ident(chars)
        .ok_or_else(|| SelectorError::parse(source, "expected an attribute name"))?;
    skip_whitespace(chars);

    let operator = match chars.next() {
        Some(']') => return Ok(AttributeSelector::Exists(name)),
        Some('=') => '=',
        Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
            if chars.next() != Some('=') {
                return Err(SelectorError::parse(
                    source,
                    format!("expected `=` after `{op}` in attribute selector"),
                ));
            }
            op
        }
        _ => return Err(SelectorError::parse(source, "malformed attribute selector")),
    };

    skip_whitespace(chars);
    let value = match chars.peek() {
        Some(&quote @ ('"' | '\'')) => {
            let _ = chars.next();
            consume_string(chars, quote)
                .ok_or_else(|| SelectorError::parse(source, "unterminated attribute value"))?
        }
        _ => consume_bare_value(chars)
            .ok_or_else(|| SelectorError::parse(source, "expected an attribute value"))?,
    };
    skip_whitespace(chars);
    if chars.next() != Some(']') {
        return Err(SelectorError::parse(source, "expected `]` after attribute value"));
    }

    Ok(match operator {
        '=' => AttributeSelector::Equals(name, value),
        '~' => AttributeSelector::Includes(name, value),
        '|' => AttributeSelector::DashMatch(name, value),
        '^' => AttributeSelector::PrefixMatch(name, value),
        '$' => AttributeSelector::SuffixMatch(name, value),
        _ => AttributeSelector::SubstringMatch(name, value),
    })
}

/// Parse a pseudo-class after its colon, capturing the raw argument.
fn parse_pseudo_class(source: &str, chars: &mut Input<'_>) -> Result<Condition, SelectorError> {
    if chars.peek() == Some(&':') {
        return Err(SelectorError::parse(
            source,
            "pseudo-elements do not select elements",
        ));
    }
    let name = consume_ident(chars)
        .ok_or_else(|| SelectorError::parse(source, "expected a pseudo-class name after `:`"))?;

    if chars.peek() != Some(&'(') {
        return Ok(Condition::new(&name, None));
    }
    let _ = chars.next();

    let mut argument = String::new();
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        match (c, quote) {
            ('\\', _) => {
                argument.push(c);
                if let Some(escaped) = chars.next() {
                    argument.push(escaped);
                }
                continue;
            }
            (_, Some(q)) if c == q => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('(', None) => depth += 1,
            (')', None) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Condition::new(&name, Some(&argument)));
                }
            }
            _ => {}
        }
        argument.push(c);
    }

    Err(SelectorError::parse(
        source,
        format!("unbalanced parentheses in :{name}("),
    ))
}

/// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
///
/// Returns `None` when no identifier characters are present.
fn consume_ident(chars: &mut Input<'_>) -> Option<String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c == '\\' {
            let _ = chars.next();
            ident.push(consume_escape(chars));
        } else if is_ident_char(c) {
            ident.push(c);
            let _ = chars.next();
        } else {
            break;
        }
    }
    (!ident.is_empty()).then_some(ident)
}

/// Unquoted attribute value: identifier characters plus `.` (for `[src$=.png]`).
fn consume_bare_value(chars: &mut Input<'_>) -> Option<String> {
    let mut value = String::new();
    while let Some(&c) = chars.peek() {
        if c == '\\' {
            let _ = chars.next();
            value.push(consume_escape(chars));
        } else if is_ident_char(c) || c == '.' {
            value.push(c);
            let _ = chars.next();
        } else {
            break;
        }
    }
    (!value.is_empty()).then_some(value)
}

/// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
///
/// The opening quote is already consumed; `None` if the string never closes.
fn consume_string(chars: &mut Input<'_>, quote: char) -> Option<String> {
    let mut value = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.push(consume_escape(chars)),
            c if c == quote => return Some(value),
            c => value.push(c),
        }
    }
    None
}

/// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
///
/// The backslash is already consumed.
fn consume_escape(chars: &mut Input<'_>) -> char {
    let Some(first) = chars.next() else {
        return char::REPLACEMENT_CHARACTER;
    };
    if !first.is_ascii_hexdigit() {
        return first;
    }

    let mut hex = String::from(first);
    while hex.len() < 6 {
        match chars.peek() {
            Some(&c) if c.is_ascii_hexdigit() => {
                hex.push(c);
                let _ = chars.next();
            }
            _ => break,
        }
    }
    // "If the next input code point is whitespace, consume it as well."
    if chars.peek().is_some_and(|c| c.is_whitespace()) {
        let _ = chars.next();
    }

    u32::from_str_radix(&hex, 16)
        .ok()
        .filter(|&code| code != 0)
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn skip_whitespace(chars: &mut Input<'_>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        let _ = chars.next();
    }
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}
