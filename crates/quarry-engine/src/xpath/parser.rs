//! Recursive descent parser for `XPath` 1.0.
//!
//! One method per production of the
//! [grammar](https://www.w3.org/TR/xpath-10/#section-Expressions), loosest
//! binding first: `or`, `and`, equality, relational, additive,
//! multiplicative, unary minus, union, path.

use super::XPathError;
use super::ast::{Axis, BinaryOp, Expr, NodeTest, Step};
use super::lexer::{Token, tokenize};

/// Parse an expression.
pub fn parse(input: &str) -> Result<Expr, XPathError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(XPathError::Syntax("empty expression".to_string()));
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(XPathError::Syntax(format!("unexpected `{token}` after expression")));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), XPathError> {
        if self.eat(token) {
            return Ok(());
        }
        Err(XPathError::Syntax(format!(
            "expected `{token}`, found {}",
            self.describe_current()
        )))
    }

    fn describe_current(&self) -> String {
        self.peek()
            .map_or_else(|| "end of expression".to_string(), |token| format!("`{token}`"))
    }

    /// Parse a left-associative chain of `operand (op operand)*`.
    fn binary_chain(
        &mut self,
        operators: &[(Token, BinaryOp)],
        operand: fn(&mut Self) -> Result<Expr, XPathError>,
    ) -> Result<Expr, XPathError> {
        let mut left = operand(self)?;
        'chain: loop {
            for (token, op) in operators {
                if self.eat(token) {
                    let right = operand(self)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'chain;
                }
            }
            return Ok(left);
        }
    }

    fn parse_or(&mut self) -> Result<Expr, XPathError> {
        self.binary_chain(&[(Token::Or, BinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, XPathError> {
        self.binary_chain(&[(Token::And, BinaryOp::And)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, XPathError> {
        self.binary_chain(
            &[(Token::Equal, BinaryOp::Equal), (Token::NotEqual, BinaryOp::NotEqual)],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> Result<Expr, XPathError> {
        self.binary_chain(
            &[
                (Token::LessEqual, BinaryOp::LessEqual),
                (Token::Less, BinaryOp::Less),
                (Token::GreaterEqual, BinaryOp::GreaterEqual),
                (Token::Greater, BinaryOp::Greater),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expr, XPathError> {
        self.binary_chain(
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Subtract)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, XPathError> {
        self.binary_chain(
            &[
                (Token::Multiply, BinaryOp::Multiply),
                (Token::Div, BinaryOp::Divide),
                (Token::Mod, BinaryOp::Modulo),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, XPathError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Negate(Box::new(self.parse_unary()?)));
        }
        self.binary_chain(&[(Token::Pipe, BinaryOp::Union)], Self::parse_path_expr)
    }

    /// `PathExpr ::= LocationPath | FilterExpr (('/' | '//') RelativeLocationPath)?`
    fn parse_path_expr(&mut self) -> Result<Expr, XPathError> {
        match self.peek() {
            Some(
                Token::Literal(_) | Token::Number(_) | Token::LeftParen | Token::FunctionName(_),
            ) => {
                let primary = self.parse_primary()?;
                let predicates = self.parse_predicates()?;
                let mut steps = Vec::new();
                if self.eat(&Token::DoubleSlash) {
                    steps.push(Step::new(Axis::DescendantOrSelf, NodeTest::Node));
                    self.parse_relative_path(&mut steps)?;
                } else if self.eat(&Token::Slash) {
                    self.parse_relative_path(&mut steps)?;
                }
                if predicates.is_empty() && steps.is_empty() {
                    return Ok(primary);
                }
                Ok(Expr::Filter {
                    primary: Box::new(primary),
                    predicates,
                    steps,
                })
            }
            _ => self.parse_location_path(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, XPathError> {
        match self.tokens.get(self.pos).cloned() {
            Some(Token::Literal(value)) => {
                self.pos += 1;
                Ok(Expr::Literal(value))
            }
            Some(Token::Number(value)) => {
                self.pos += 1;
                Ok(Expr::Number(value))
            }
            Some(Token::LeftParen) => {
                self.pos += 1;
                let expr = self.parse_or()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }
            Some(Token::FunctionName(name)) => {
                self.pos += 1;
                self.expect(&Token::LeftParen)?;
                let mut args = Vec::new();
                if !self.eat(&Token::RightParen) {
                    args.push(self.parse_or()?);
                    while self.eat(&Token::Comma) {
                        args.push(self.parse_or()?);
                    }
                    self.expect(&Token::RightParen)?;
                }
                Ok(Expr::Call(name, args))
            }
            _ => Err(XPathError::Syntax(format!(
                "expected an expression, found {}",
                self.describe_current()
            ))),
        }
    }

    fn parse_location_path(&mut self) -> Result<Expr, XPathError> {
        let mut steps = Vec::new();
        if self.eat(&Token::DoubleSlash) {
            steps.push(Step::new(Axis::DescendantOrSelf, NodeTest::Node));
            self.parse_relative_path(&mut steps)?;
            return Ok(Expr::Path { absolute: true, steps });
        }
        if self.eat(&Token::Slash) {
            if self.at_step_start() {
                self.parse_relative_path(&mut steps)?;
            }
            return Ok(Expr::Path { absolute: true, steps });
        }
        self.parse_relative_path(&mut steps)?;
        Ok(Expr::Path { absolute: false, steps })
    }

    fn parse_relative_path(&mut self, steps: &mut Vec<Step>) -> Result<(), XPathError> {
        steps.push(self.parse_step()?);
        loop {
            if self.eat(&Token::DoubleSlash) {
                steps.push(Step::new(Axis::DescendantOrSelf, NodeTest::Node));
            } else if !self.eat(&Token::Slash) {
                return Ok(());
            }
            steps.push(self.parse_step()?);
        }
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Dot
                    | Token::DotDot
                    | Token::At
                    | Token::Name(_)
                    | Token::NodeType(_)
                    | Token::AxisName(_)
            )
        )
    }

    fn parse_step(&mut self) -> Result<Step, XPathError> {
        if self.eat(&Token::Dot) {
            return Ok(Step::new(Axis::SelfNode, NodeTest::Node));
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step::new(Axis::Parent, NodeTest::Node));
        }

        let axis = if self.eat(&Token::At) {
            Axis::Attribute
        } else if let Some(Token::AxisName(name)) = self.peek() {
            let axis = Axis::from_name(name)
                .ok_or_else(|| XPathError::UnsupportedAxis(name.clone()))?;
            self.pos += 1;
            self.expect(&Token::ColonColon)?;
            axis
        } else {
            Axis::Child
        };

        let test = match self.tokens.get(self.pos).cloned() {
            Some(Token::Name(name)) => {
                self.pos += 1;
                if name == "*" { NodeTest::Any } else { NodeTest::Name(name) }
            }
            Some(Token::NodeType(kind)) => {
                self.pos += 1;
                self.expect(&Token::LeftParen)?;
                self.expect(&Token::RightParen)?;
                match kind.as_str() {
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => NodeTest::Node,
                }
            }
            _ => {
                return Err(XPathError::Syntax(format!(
                    "expected a node test, found {}",
                    self.describe_current()
                )));
            }
        };

        Ok(Step {
            axis,
            test,
            predicates: self.parse_predicates()?,
        })
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expr>, XPathError> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.parse_or()?);
            self.expect(&Token::RightBracket)?;
        }
        Ok(predicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(name: &str) -> Step {
        Step::new(Axis::Child, NodeTest::Name(name.to_string()))
    }

    #[test]
    fn test_parse_abbreviations() {
        assert_eq!(
            parse("..").unwrap(),
            Expr::Path {
                absolute: false,
                steps: vec![Step::new(Axis::Parent, NodeTest::Node)],
            }
        );
        assert_eq!(
            parse(".//li").unwrap(),
            Expr::Path {
                absolute: false,
                steps: vec![
                    Step::new(Axis::SelfNode, NodeTest::Node),
                    Step::new(Axis::DescendantOrSelf, NodeTest::Node),
                    child("li"),
                ],
            }
        );
        assert_eq!(
            parse("/").unwrap(),
            Expr::Path {
                absolute: true,
                steps: Vec::new(),
            }
        );
    }

    #[test]
    fn test_parse_predicate_precedence() {
        let Expr::Path { steps, .. } = parse("./*[a = 1 or b and c]").unwrap() else {
            panic!("expected a path");
        };
        assert_eq!(steps[1].test, NodeTest::Any);
        assert!(matches!(&steps[1].predicates[0], Expr::Binary(BinaryOp::Or, _, right)
            if matches!(**right, Expr::Binary(BinaryOp::And, _, _))));
    }

    #[test]
    fn test_parse_unary_minus_and_arithmetic() {
        assert_eq!(
            parse("-1 + 2 mod 3").unwrap(),
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Negate(Box::new(Expr::Number(1.0)))),
                Box::new(Expr::Binary(
                    BinaryOp::Modulo,
                    Box::new(Expr::Number(2.0)),
                    Box::new(Expr::Number(3.0)),
                )),
            )
        );
    }

    #[test]
    fn test_parse_errors() {
        for expression in ["", "./*[", "a =", "following::a", "count(", "a b"] {
            assert!(parse(expression).is_err(), "{expression:?} should not parse");
        }
    }
}
