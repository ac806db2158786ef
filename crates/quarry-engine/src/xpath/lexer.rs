//! `XPath` 1.0 tokenizer.
//!
//! Names are classified with the disambiguation rules of
//! [§ 3.7 Lexical Structure](https://www.w3.org/TR/xpath-10/#exprlex):
//! - after an operand, `*` is the multiply operator and `and`, `or`, `mod`,
//!   `div` are operators;
//! - a name followed by `(` is a node type or a function name;
//! - a name followed by `::` is an axis name;
//! - anything else is a name test.

use std::fmt;

use super::XPathError;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `@`
    At,
    /// `,`
    Comma,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `::`
    ColonColon,
    /// `|`
    Pipe,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*` in operator position
    Multiply,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `and`
    And,
    /// `or`
    Or,
    /// `mod`
    Mod,
    /// `div`
    Div,
    /// Quoted string, quotes removed.
    Literal(String),
    /// Numeric literal.
    Number(f64),
    /// Name test, `*` included.
    Name(String),
    /// Name followed by `(` that is not a node type.
    FunctionName(String),
    /// Name followed by `::`.
    AxisName(String),
    /// `node`, `text` or `comment` followed by `(`.
    NodeType(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Slash => "/",
            Self::DoubleSlash => "//",
            Self::Dot => ".",
            Self::DotDot => "..",
            Self::At => "@",
            Self::Comma => ",",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::ColonColon => "::",
            Self::Pipe => "|",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "and",
            Self::Or => "or",
            Self::Mod => "mod",
            Self::Div => "div",
            Self::Literal(value) => return write!(f, "'{value}'"),
            Self::Number(value) => return write!(f, "{value}"),
            Self::Name(name)
            | Self::FunctionName(name)
            | Self::AxisName(name)
            | Self::NodeType(name) => name,
        };
        f.write_str(text)
    }
}

impl Token {
    /// Whether a `*` or an operator name after this token starts an operand.
    const fn expects_operand(&self) -> bool {
        matches!(
            self,
            Self::At
                | Self::ColonColon
                | Self::LeftParen
                | Self::LeftBracket
                | Self::Comma
                | Self::Slash
                | Self::DoubleSlash
                | Self::Pipe
                | Self::Plus
                | Self::Minus
                | Self::Multiply
                | Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
                | Self::And
                | Self::Or
                | Self::Mod
                | Self::Div
        )
    }
}

/// Split an expression into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, XPathError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }
        let operand_expected = tokens.last().is_none_or(Token::expects_operand);
        let next = chars.get(pos + 1).copied();

        let (token, len) = match c {
            '/' if next == Some('/') => (Token::DoubleSlash, 2),
            '/' => (Token::Slash, 1),
            '.' if next == Some('.') => (Token::DotDot, 2),
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => number(&chars, pos),
            '.' => (Token::Dot, 1),
            '@' => (Token::At, 1),
            ',' => (Token::Comma, 1),
            '(' => (Token::LeftParen, 1),
            ')' => (Token::RightParen, 1),
            '[' => (Token::LeftBracket, 1),
            ']' => (Token::RightBracket, 1),
            ':' if next == Some(':') => (Token::ColonColon, 2),
            '|' => (Token::Pipe, 1),
            '+' => (Token::Plus, 1),
            '-' => (Token::Minus, 1),
            '*' if operand_expected => (Token::Name("*".to_string()), 1),
            '*' => (Token::Multiply, 1),
            '=' => (Token::Equal, 1),
            '!' if next == Some('=') => (Token::NotEqual, 2),
            '<' if next == Some('=') => (Token::LessEqual, 2),
            '<' => (Token::Less, 1),
            '>' if next == Some('=') => (Token::GreaterEqual, 2),
            '>' => (Token::Greater, 1),
            '"' | '\'' => {
                let end = chars[pos + 1..]
                    .iter()
                    .position(|&q| q == c)
                    .ok_or(XPathError::UnterminatedLiteral { offset: pos })?;
                let value: String = chars[pos + 1..=pos + end].iter().collect();
                (Token::Literal(value), end + 2)
            }
            c if c.is_ascii_digit() => number(&chars, pos),
            c if is_name_start(c) => {
                let len = chars[pos..].iter().take_while(|&&n| is_name_char(n)).count();
                let name: String = chars[pos..pos + len].iter().collect();
                (classify(name, operand_expected, &chars[pos + len..]), len)
            }
            found => return Err(XPathError::UnexpectedCharacter { found, offset: pos }),
        };

        tokens.push(token);
        pos += len;
    }

    Ok(tokens)
}

fn number(chars: &[char], start: usize) -> (Token, usize) {
    let mut len = chars[start..].iter().take_while(|c| c.is_ascii_digit()).count();
    if chars.get(start + len) == Some(&'.') {
        len += 1;
        len += chars[start + len..].iter().take_while(|c| c.is_ascii_digit()).count();
    }
    let text: String = chars[start..start + len].iter().collect();
    // Digits with at most one dot always parse.
    (Token::Number(text.parse().unwrap_or(f64::NAN)), len)
}

fn classify(name: String, operand_expected: bool, rest: &[char]) -> Token {
    if !operand_expected {
        match name.as_str() {
            "and" => return Token::And,
            "or" => return Token::Or,
            "mod" => return Token::Mod,
            "div" => return Token::Div,
            _ => {}
        }
    }
    let mut following = rest.iter().skip_while(|c| c.is_whitespace());
    match (following.next(), following.next()) {
        (Some('('), _) if matches!(name.as_str(), "node" | "text" | "comment") => {
            Token::NodeType(name)
        }
        (Some('('), _) => Token::FunctionName(name),
        (Some(':'), Some(':')) => Token::AxisName(name),
        _ => Token::Name(name),
    }
}

const fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

const fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_location_path() {
        assert_eq!(
            tokenize(".//*[@id = 'x']").unwrap(),
            vec![
                Token::Dot,
                Token::DoubleSlash,
                Token::Name("*".to_string()),
                Token::LeftBracket,
                Token::At,
                Token::Name("id".to_string()),
                Token::Equal,
                Token::Literal("x".to_string()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_operator_names_depend_on_position() {
        assert_eq!(
            tokenize("div mod div").unwrap(),
            vec![
                Token::Name("div".to_string()),
                Token::Mod,
                Token::Name("div".to_string()),
            ]
        );
        assert_eq!(
            tokenize("(position() - 1) mod 2").unwrap(),
            vec![
                Token::LeftParen,
                Token::FunctionName("position".to_string()),
                Token::LeftParen,
                Token::RightParen,
                Token::Minus,
                Token::Number(1.0),
                Token::RightParen,
                Token::Mod,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_axis_and_node_type_names() {
        assert_eq!(
            tokenize("parent::* | text()").unwrap(),
            vec![
                Token::AxisName("parent".to_string()),
                Token::ColonColon,
                Token::Name("*".to_string()),
                Token::Pipe,
                Token::NodeType("text".to_string()),
                Token::LeftParen,
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_lexical_errors() {
        assert_eq!(
            tokenize("'open"),
            Err(XPathError::UnterminatedLiteral { offset: 0 })
        );
        assert_eq!(
            tokenize("a # b"),
            Err(XPathError::UnexpectedCharacter { found: '#', offset: 2 })
        );
    }
}
