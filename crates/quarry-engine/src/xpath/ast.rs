//! Syntax tree of parsed `XPath` expressions.

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Binary operator application.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Unary minus.
    Negate(Box<Expr>),
    /// String literal.
    Literal(String),
    /// Numeric literal.
    Number(f64),
    /// Function call.
    Call(String, Vec<Expr>),
    /// Location path, absolute when it starts at the document node.
    Path {
        /// Whether the path starts with `/`.
        absolute: bool,
        /// Steps, left to right.
        steps: Vec<Step>,
    },
    /// Primary expression with predicates, optionally continued by a path.
    Filter {
        /// The filtered expression; must produce a node-set.
        primary: Box<Expr>,
        /// Predicates, applied in document order.
        predicates: Vec<Expr>,
        /// Steps after a trailing `/` or `//`.
        steps: Vec<Step>,
    },
}

/// Binary operators, loosest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `or`
    Or,
    /// `and`
    And,
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
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `div`
    Divide,
    /// `mod`
    Modulo,
    /// `|`
    Union,
}

/// One location step: `axis::test[predicate]...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Direction of the step.
    pub axis: Axis,
    /// Which nodes on the axis are kept.
    pub test: NodeTest,
    /// Predicates, positions counted along the axis.
    pub predicates: Vec<Expr>,
}

impl Step {
    /// A step without predicates.
    #[must_use]
    pub const fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }
}

/// [§ 2.2 Axes](https://www.w3.org/TR/xpath-10/#axes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `child::`
    Child,
    /// `descendant::`
    Descendant,
    /// `descendant-or-self::`
    DescendantOrSelf,
    /// `parent::`
    Parent,
    /// `ancestor::`
    Ancestor,
    /// `ancestor-or-self::`
    AncestorOrSelf,
    /// `self::`
    SelfNode,
    /// `attribute::` / `@`
    Attribute,
    /// `following-sibling::`
    FollowingSibling,
    /// `preceding-sibling::`
    PrecedingSibling,
}

impl Axis {
    /// Look an axis up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let axis = match name {
            "child" => Self::Child,
            "descendant" => Self::Descendant,
            "descendant-or-self" => Self::DescendantOrSelf,
            "parent" => Self::Parent,
            "ancestor" => Self::Ancestor,
            "ancestor-or-self" => Self::AncestorOrSelf,
            "self" => Self::SelfNode,
            "attribute" => Self::Attribute,
            "following-sibling" => Self::FollowingSibling,
            "preceding-sibling" => Self::PrecedingSibling,
            _ => return None,
        };
        Some(axis)
    }
}

/// [§ 2.3 Node Tests](https://www.w3.org/TR/xpath-10/#node-tests)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`: any node of the axis's principal type.
    Any,
    /// A name of the axis's principal type.
    Name(String),
    /// `text()`
    Text,
    /// `comment()`
    Comment,
    /// `node()`
    Node,
}
