//! Escaping for values re-injected into native and path query expressions.
//!
//! References for CSS escaping:
//! - <https://mathiasbynens.be/notes/css-escapes>
//! - [§ 2.1 Serializing identifiers](https://drafts.csswg.org/cssom/#serialize-an-identifier)

/// Escape a CSS identifier (an id or class name) for a native query.
///
/// - a leading digit becomes a numeric escape (`1a` → `\31 a`);
/// - every `:` is escaped;
/// - a leading `-` is escaped when the identifier is exactly `-` or its
///   second character is a digit or another `-`.
#[must_use]
pub fn escape_selector(ident: &str) -> String {
    let mut escaped = String::with_capacity(ident.len() + 4);
    let mut chars = ident.chars();

    match chars.next() {
        None => return escaped,
        Some(first) if first.is_ascii_digit() => {
            escaped.push_str(&format!("\\3{first} "));
        }
        Some(':') => escaped.push_str("\\:"),
        Some('-') => {
            let second = ident[1..].chars().next();
            if second.is_none_or(|c| c.is_ascii_digit() || c == '-') {
                escaped.push('\\');
            }
            escaped.push('-');
        }
        Some(first) => escaped.push(first),
    }

    for c in chars {
        if c == ':' {
            escaped.push_str("\\:");
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Quote an attribute value for a native query: `a"b` → `"a\"b"`.
///
/// Steps run in this order so nothing is escaped twice: unescape `\"`,
/// escape every `\`, escape every `"`, wrap in double quotes.
#[must_use]
pub fn escape_attribute_value(value: &str) -> String {
    let unescaped = value.replace("\\\"", "\"");
    let backslashes = unescaped.replace('\\', "\\\\");
    let quotes = backslashes.replace('"', "\\\"");
    format!("\"{quotes}\"")
}

/// Quote a string as an `XPath` 1.0 literal.
///
/// `XPath` has no escape sequences, so a value containing both quote kinds is
/// spliced together with `concat()`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_digit_is_numerically_escaped() {
        assert_eq!(escape_selector("1abc"), "\\31 abc");
        assert_eq!(escape_selector("9"), "\\39 ");
    }

    #[test]
    fn test_hyphen_escaping() {
        assert_eq!(escape_selector("-1abc"), "\\-1abc");
        assert_eq!(escape_selector("-"), "\\-");
        assert_eq!(escape_selector("--x"), "\\--x");
        assert_eq!(escape_selector("-foo"), "-foo");
    }

    #[test]
    fn test_colons_are_escaped_everywhere() {
        assert_eq!(escape_selector("a:b:c"), "a\\:b\\:c");
        assert_eq!(escape_selector(":x"), "\\:x");
        assert_eq!(escape_selector("1:2"), "\\31 \\:2");
    }

    #[test]
    fn test_plain_identifiers_are_untouched() {
        assert_eq!(escape_selector("main-content"), "main-content");
        assert_eq!(escape_selector(""), "");
    }

    #[test]
    fn test_attribute_value_quoting() {
        assert_eq!(escape_attribute_value("plain"), "\"plain\"");
        assert_eq!(escape_attribute_value("a\"b"), "\"a\\\"b\"");
        // an already-escaped quote is not escaped twice
        assert_eq!(escape_attribute_value("a\\\"b"), "\"a\\\"b\"");
        assert_eq!(escape_attribute_value("c:\\dir"), "\"c:\\\\dir\"");
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("abc"), "'abc'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal("a'b\"c"),
            "concat('a', \"'\", 'b\"c')"
        );
    }
}
