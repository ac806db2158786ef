//! The `an+b` argument grammar of `:nth-child()` and friends.
//!
//! [§ 14.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
//!
//! Accepted forms (after trimming, `n` is case-sensitive):
//! - `b`: an optionally signed integer, `:nth-child(3)`
//! - `an`: `:nth-child(2n)`
//! - `an+b` / `an-b`, whitespace allowed before the sign: `:nth-child(2n +1)`
//!
//! The `odd`/`even` keywords and negative `a` coefficients are rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SelectorError;

static B_ONLY: LazyLock<Regex> = LazyLock::new(|| compile(r"^[+-]?\d+$"));
static A_ONLY: LazyLock<Regex> = LazyLock::new(|| compile(r"^\d+n$"));
static A_AND_B: LazyLock<Regex> = LazyLock::new(|| compile(r"^\d+n\s*[+-]?\d+$"));
static A_AND_B_PARTS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(\d+)n(?:\s*([+-]\s*\d+))?"));

fn compile(pattern: &str) -> Regex {
    // Only called with the literal patterns above.
    Regex::new(pattern).unwrap()
}

/// Parsed `an+b` argument.
///
/// Exactly one shape holds: `a` only, `b` only, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthArgument {
    /// Step coefficient; `None` for the pure-integer form.
    pub a: Option<i32>,
    /// Offset; `None` for the pure `an` form.
    pub b: Option<i32>,
}

impl NthArgument {
    /// Parse the argument of `:nth-child()`.
    pub fn parse(argument: &str) -> Result<Self, SelectorError> {
        Self::parse_for("nth-child", argument)
    }

    /// Parse an `an+b` argument, naming `pseudo` in errors.
    pub fn parse_for(pseudo: &str, argument: &str) -> Result<Self, SelectorError> {
        let trimmed = argument.trim();
        let invalid = || invalid_argument(pseudo, argument);

        if B_ONLY.is_match(trimmed) {
            return Ok(Self {
                a: None,
                b: Some(to_int(trimmed).ok_or_else(invalid)?),
            });
        }

        if A_ONLY.is_match(trimmed) {
            let digits = &trimmed[..trimmed.len() - 1];
            return Ok(Self {
                a: Some(to_int(digits).ok_or_else(invalid)?),
                b: None,
            });
        }

        if A_AND_B.is_match(trimmed) {
            let parts = A_AND_B_PARTS.captures(trimmed).ok_or_else(invalid)?;
            // `2n1` passes the shape check but carries no signed offset.
            let (Some(a), Some(b)) = (parts.get(1), parts.get(2)) else {
                return Err(invalid());
            };
            return Ok(Self {
                a: Some(to_int(a.as_str()).ok_or_else(invalid)?),
                b: Some(to_int(b.as_str()).ok_or_else(invalid)?),
            });
        }

        Err(invalid())
    }

    /// Render as a native `:nth-child(...)` query.
    #[must_use]
    pub fn to_native_query(&self) -> String {
        self.to_native_query_for("nth-child")
    }

    /// Render as a native query for another nth-family pseudo-class.
    #[must_use]
    pub fn to_native_query_for(&self, pseudo: &str) -> String {
        let a = self.a.map(|a| format!("{a}n")).unwrap_or_default();
        let b = match (self.a, self.b) {
            (_, None) => String::new(),
            (None, Some(b)) => b.to_string(),
            (Some(_), Some(b)) => format!("{b:+}"),
        };
        format!(":{pseudo}({a}{b})")
    }

    /// Render as an `XPath` predicate over `position()`.
    #[must_use]
    pub fn to_path_query(&self) -> String {
        self.to_path_query_at("position()")
    }

    /// Render as an `XPath` predicate over an arbitrary 1-based position
    /// expression (`(last() - position() + 1)` counts from the end).
    #[must_use]
    pub fn to_path_query_at(&self, position: &str) -> String {
        let a = self.a.unwrap_or(0);
        let b = self.b.unwrap_or(0);
        if a == 0 {
            return format!("{position} = {b}");
        }
        format!("({position} - {b}) mod {a} = 0 and {position} >= {b}")
    }

    /// Whether a 1-based sibling index satisfies `an+b` for some `n >= 0`.
    #[must_use]
    pub fn matches(&self, position: i64) -> bool {
        let a = i64::from(self.a.unwrap_or(0));
        let b = i64::from(self.b.unwrap_or(0));
        if a == 0 {
            return position == b;
        }
        (position - b) % a == 0 && position >= b
    }
}

/// Integer literal with an optional sign; whitespace after the sign is dropped.
fn to_int(literal: &str) -> Option<i32> {
    let compact: String = literal.chars().filter(|c| !c.is_whitespace()).collect();
    let unsigned = compact.strip_prefix('+').unwrap_or(&compact);
    unsigned.parse().ok()
}

fn invalid_argument(pseudo: &str, argument: &str) -> SelectorError {
    SelectorError::Syntax {
        pseudo: pseudo.to_string(),
        argument: argument.to_string(),
        reason: format!(
            "the :{pseudo}() pseudo-class must have an argument like :{pseudo}(an+b), \
             :{pseudo}(an) or :{pseudo}(b) - where a and b are integers -, but was :{pseudo}({argument})"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        assert_eq!(NthArgument::parse("3").unwrap(), NthArgument { a: None, b: Some(3) });
        assert_eq!(NthArgument::parse(" +4 ").unwrap(), NthArgument { a: None, b: Some(4) });
        assert_eq!(NthArgument::parse("-2").unwrap(), NthArgument { a: None, b: Some(-2) });
        assert_eq!(NthArgument::parse("2n").unwrap(), NthArgument { a: Some(2), b: None });
        assert_eq!(
            NthArgument::parse("2n+1").unwrap(),
            NthArgument { a: Some(2), b: Some(1) }
        );
        assert_eq!(
            NthArgument::parse("3n -2").unwrap(),
            NthArgument { a: Some(3), b: Some(-2) }
        );
    }

    #[test]
    fn test_native_rendering() {
        assert_eq!(NthArgument::parse("2n+1").unwrap().to_native_query(), ":nth-child(2n+1)");
        assert_eq!(NthArgument::parse("2n -1").unwrap().to_native_query(), ":nth-child(2n-1)");
        assert_eq!(NthArgument::parse("+5").unwrap().to_native_query(), ":nth-child(5)");
        assert_eq!(NthArgument::parse("4n").unwrap().to_native_query(), ":nth-child(4n)");
        assert_eq!(NthArgument::parse("2n+0").unwrap().to_native_query(), ":nth-child(2n+0)");
        assert_eq!(
            NthArgument::parse("3").unwrap().to_native_query_for("nth-last-child"),
            ":nth-last-child(3)"
        );
    }

    #[test]
    fn test_path_rendering() {
        assert_eq!(NthArgument::parse("3").unwrap().to_path_query(), "position() = 3");
        assert_eq!(
            NthArgument::parse("2n").unwrap().to_path_query(),
            "(position() - 0) mod 2 = 0 and position() >= 0"
        );
        assert_eq!(
            NthArgument::parse("2n+1").unwrap().to_path_query(),
            "(position() - 1) mod 2 = 0 and position() >= 1"
        );
        assert_eq!(NthArgument::parse("0n+2").unwrap().to_path_query(), "position() = 2");
    }

    #[test]
    fn test_invalid_arguments_name_the_argument() {
        for argument in [
            "odd",
            "even",
            "abc",
            "2m+1",
            "",
            "n",
            "-2n+1",
            "2n1",
            "2n - 1",
            "99999999999",
        ] {
            match NthArgument::parse(argument) {
                Err(SelectorError::Syntax {
                    pseudo,
                    argument: reported,
                    reason,
                }) => {
                    assert_eq!(pseudo, "nth-child");
                    assert_eq!(reported, argument);
                    assert!(reason.ends_with(&format!(":nth-child({argument})")));
                }
                other => panic!("{argument:?} should be a syntax error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_matches_counts_like_nth_child() {
        let odd = NthArgument::parse("2n+1").unwrap();
        let hits: Vec<i64> = (1..=7).filter(|&p| odd.matches(p)).collect();
        assert_eq!(hits, vec![1, 3, 5, 7]);

        let from_third = NthArgument::parse("1n+3").unwrap();
        let hits: Vec<i64> = (1..=5).filter(|&p| from_third.matches(p)).collect();
        assert_eq!(hits, vec![3, 4, 5]);

        let third = NthArgument::parse("3").unwrap();
        assert!(third.matches(3));
        assert!(!third.matches(6));
    }
}
