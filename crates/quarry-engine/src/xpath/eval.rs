//! Expression evaluation.
//!
//! [§ 1 Introduction](https://www.w3.org/TR/xpath-10/#section-Introduction):
//! "Expression evaluation occurs with respect to a context", here a node,
//! its position and the size of the node list it came from.

// Number comparisons are IEEE 754 equality.
#![allow(clippy::float_cmp)]

use std::cmp::Ordering;

use quarry_dom::{DomTree, NodeId, NodeType};

use super::XPathError;
use super::ast::{Axis, BinaryOp, Expr, NodeTest, Step};

/// A node of the `XPath` data model.
///
/// Attributes are not tree nodes in the arena, so they are addressed by
/// their owner element and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum XNode {
    /// Document, element, text or comment node.
    Tree(NodeId),
    /// Attribute node.
    Attribute {
        /// The element carrying the attribute.
        owner: NodeId,
        /// Attribute name.
        name: String,
    },
}

/// [§ 1](https://www.w3.org/TR/xpath-10/#section-Introduction) the four
/// basic types an expression evaluates to.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nodes in document order, without duplicates.
    NodeSet(Vec<XNode>),
    /// `true()` / `false()`
    Boolean(bool),
    /// IEEE 754 double.
    Number(f64),
    /// Character string.
    String(String),
}

struct Focus<'n> {
    node: &'n XNode,
    position: usize,
    size: usize,
}

/// Evaluates parsed expressions against one tree.
pub struct Evaluator<'t> {
    tree: &'t DomTree,
    order: &'t [usize],
}

impl<'t> Evaluator<'t> {
    /// An evaluator over `tree`; `order` is [`DomTree::document_order`].
    #[must_use]
    pub const fn new(tree: &'t DomTree, order: &'t [usize]) -> Self {
        Self { tree, order }
    }

    /// Evaluate `expr` with `context` as the context node.
    pub fn evaluate(&self, expr: &Expr, context: &XNode) -> Result<Value, XPathError> {
        self.eval(
            expr,
            &Focus {
                node: context,
                position: 1,
                size: 1,
            },
        )
    }

    fn eval(&self, expr: &Expr, focus: &Focus<'_>) -> Result<Value, XPathError> {
        match expr {
            Expr::Literal(value) => Ok(Value::String(value.clone())),
            Expr::Number(value) => Ok(Value::Number(*value)),
            Expr::Negate(operand) => Ok(Value::Number(-self.number(&self.eval(operand, focus)?))),
            Expr::Binary(op, left, right) => self.eval_binary(*op, left, right, focus),
            Expr::Call(name, args) => self.call(name, args, focus),
            Expr::Path { absolute, steps } => {
                let start = if *absolute {
                    XNode::Tree(NodeId::ROOT)
                } else {
                    focus.node.clone()
                };
                Ok(Value::NodeSet(self.eval_steps(vec![start], steps)?))
            }
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                let Value::NodeSet(nodes) = self.eval(primary, focus)? else {
                    return Err(XPathError::NotANodeSet);
                };
                let nodes = self.apply_predicates(nodes, predicates)?;
                Ok(Value::NodeSet(self.eval_steps(nodes, steps)?))
            }
        }
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        focus: &Focus<'_>,
    ) -> Result<Value, XPathError> {
        // [§ 3.4 Booleans](https://www.w3.org/TR/xpath-10/#booleans): the right
        // operand is not evaluated when the left one decides.
        match op {
            BinaryOp::Or => {
                return Ok(Value::Boolean(
                    to_boolean(&self.eval(left, focus)?) || to_boolean(&self.eval(right, focus)?),
                ));
            }
            BinaryOp::And => {
                return Ok(Value::Boolean(
                    to_boolean(&self.eval(left, focus)?) && to_boolean(&self.eval(right, focus)?),
                ));
            }
            _ => {}
        }

        let left = self.eval(left, focus)?;
        let right = self.eval(right, focus)?;
        let value = match op {
            BinaryOp::Union => {
                let (Value::NodeSet(mut nodes), Value::NodeSet(more)) = (left, right) else {
                    return Err(XPathError::NotANodeSet);
                };
                nodes.extend(more);
                Value::NodeSet(self.sorted(nodes))
            }
            BinaryOp::Add => Value::Number(self.number(&left) + self.number(&right)),
            BinaryOp::Subtract => Value::Number(self.number(&left) - self.number(&right)),
            BinaryOp::Multiply => Value::Number(self.number(&left) * self.number(&right)),
            BinaryOp::Divide => Value::Number(self.number(&left) / self.number(&right)),
            // Truncating remainder: the sign follows the dividend.
            BinaryOp::Modulo => Value::Number(self.number(&left) % self.number(&right)),
            _ => Value::Boolean(self.compare(op, &left, &right)),
        };
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Location paths
    // -----------------------------------------------------------------------

    fn eval_steps(&self, mut nodes: Vec<XNode>, steps: &[Step]) -> Result<Vec<XNode>, XPathError> {
        for step in steps {
            let mut selected = Vec::new();
            for node in &nodes {
                let candidates = self
                    .axis(node, step.axis)
                    .into_iter()
                    .filter(|candidate| self.test(candidate, step.axis, &step.test))
                    .collect();
                selected.extend(self.apply_predicates(candidates, &step.predicates)?);
            }
            nodes = self.sorted(selected);
        }
        Ok(nodes)
    }

    /// [§ 2.4 Predicates](https://www.w3.org/TR/xpath-10/#predicates):
    /// positions follow the order of `nodes`; a number predicate is true when
    /// it equals the position.
    fn apply_predicates(
        &self,
        mut nodes: Vec<XNode>,
        predicates: &[Expr],
    ) -> Result<Vec<XNode>, XPathError> {
        for predicate in predicates {
            let size = nodes.len();
            let mut kept = Vec::with_capacity(size);
            for (index, node) in nodes.into_iter().enumerate() {
                let focus = Focus {
                    node: &node,
                    position: index + 1,
                    size,
                };
                let keep = match self.eval(predicate, &focus)? {
                    Value::Number(n) => n == to_number(index + 1),
                    other => to_boolean(&other),
                };
                if keep {
                    kept.push(node);
                }
            }
            nodes = kept;
        }
        Ok(nodes)
    }

    /// Nodes on `axis` from `node`, nearest first for reverse axes.
    fn axis(&self, node: &XNode, axis: Axis) -> Vec<XNode> {
        let id = match node {
            XNode::Tree(id) => *id,
            XNode::Attribute { owner, .. } => {
                return match axis {
                    Axis::SelfNode => vec![node.clone()],
                    Axis::Parent => vec![XNode::Tree(*owner)],
                    Axis::AncestorOrSelf => std::iter::once(node.clone())
                        .chain(self.inclusive_ancestors(*owner))
                        .collect(),
                    Axis::Ancestor => self.inclusive_ancestors(*owner).collect(),
                    _ => Vec::new(),
                };
            }
        };

        let tree = self.tree;
        match axis {
            Axis::Child => tree.children(id).iter().copied().map(XNode::Tree).collect(),
            Axis::Descendant => tree.descendants(id).map(XNode::Tree).collect(),
            Axis::DescendantOrSelf => std::iter::once(id)
                .chain(tree.descendants(id))
                .map(XNode::Tree)
                .collect(),
            Axis::Parent => tree.parent(id).map(XNode::Tree).into_iter().collect(),
            Axis::Ancestor => tree.ancestors(id).map(XNode::Tree).collect(),
            Axis::AncestorOrSelf => self.inclusive_ancestors(id).collect(),
            Axis::SelfNode => vec![node.clone()],
            Axis::FollowingSibling => tree.following_siblings(id).map(XNode::Tree).collect(),
            Axis::PrecedingSibling => tree.preceding_siblings(id).map(XNode::Tree).collect(),
            Axis::Attribute => {
                let Some(element) = tree.as_element(id) else {
                    return Vec::new();
                };
                let mut names: Vec<&String> = element.attrs.keys().collect();
                names.sort();
                names
                    .into_iter()
                    .map(|name| XNode::Attribute {
                        owner: id,
                        name: name.clone(),
                    })
                    .collect()
            }
        }
    }

    fn inclusive_ancestors(&self, id: NodeId) -> impl Iterator<Item = XNode> + '_ {
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .map(XNode::Tree)
    }

    /// [§ 2.3 Node Tests](https://www.w3.org/TR/xpath-10/#node-tests): `*`
    /// and names select the axis's principal node type.
    fn test(&self, node: &XNode, axis: Axis, test: &NodeTest) -> bool {
        match node {
            XNode::Attribute { name, .. } => match test {
                NodeTest::Node => true,
                NodeTest::Any => axis == Axis::Attribute,
                NodeTest::Name(wanted) => axis == Axis::Attribute && wanted == name,
                NodeTest::Text | NodeTest::Comment => false,
            },
            XNode::Tree(id) => {
                let Some(tree_node) = self.tree.get(*id) else {
                    return false;
                };
                match (test, &tree_node.node_type) {
                    (NodeTest::Node, _)
                    | (NodeTest::Any, NodeType::Element(_))
                    | (NodeTest::Text, NodeType::Text(_))
                    | (NodeTest::Comment, NodeType::Comment(_)) => true,
                    (NodeTest::Name(wanted), NodeType::Element(data)) => data.tag_name == *wanted,
                    _ => false,
                }
            }
        }
    }

    /// Document order, duplicates removed. Attributes follow their owner.
    fn sorted(&self, mut nodes: Vec<XNode>) -> Vec<XNode> {
        nodes.sort_by(|a, b| self.order_key(a).cmp(&self.order_key(b)));
        nodes.dedup();
        nodes
    }

    fn order_key<'n>(&self, node: &'n XNode) -> (usize, Option<&'n str>) {
        let (id, name) = match node {
            XNode::Tree(id) => (*id, None),
            XNode::Attribute { owner, name } => (*owner, Some(name.as_str())),
        };
        (self.order.get(id.0).copied().unwrap_or(usize::MAX), name)
    }

    // -----------------------------------------------------------------------
    // Conversions
    // -----------------------------------------------------------------------

    /// [§ 5 Data Model](https://www.w3.org/TR/xpath-10/#data-model) string-value.
    fn string_value(&self, node: &XNode) -> String {
        match node {
            XNode::Attribute { owner, name } => self
                .tree
                .as_element(*owner)
                .and_then(|element| element.attr(name))
                .unwrap_or_default()
                .to_string(),
            XNode::Tree(id) => match self.tree.get(*id).map(|n| &n.node_type) {
                Some(NodeType::Comment(text)) => text.clone(),
                Some(_) => self.tree.text_content(*id),
                None => String::new(),
            },
        }
    }

    /// [§ 4.4 `number()`](https://www.w3.org/TR/xpath-10/#function-number)
    fn number(&self, value: &Value) -> f64 {
        match value {
            Value::Number(n) => *n,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::String(s) => parse_number(s),
            Value::NodeSet(_) => parse_number(&self.string(value)),
        }
    }

    /// [§ 4.2 `string()`](https://www.w3.org/TR/xpath-10/#function-string)
    fn string(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::NodeSet(nodes) => nodes
                .first()
                .map(|node| self.string_value(node))
                .unwrap_or_default(),
        }
    }

    // -----------------------------------------------------------------------
    // Comparisons
    // -----------------------------------------------------------------------

    /// [§ 3.4](https://www.w3.org/TR/xpath-10/#booleans): a comparison
    /// involving a node-set holds if it holds for some node in it.
    fn compare(&self, op: BinaryOp, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::NodeSet(nodes), Value::Boolean(_)) => {
                compare_atoms(op, &Value::Boolean(!nodes.is_empty()), right)
            }
            (Value::Boolean(_), Value::NodeSet(nodes)) => {
                compare_atoms(op, left, &Value::Boolean(!nodes.is_empty()))
            }
            (Value::NodeSet(lefts), Value::NodeSet(rights)) => lefts.iter().any(|l| {
                let l = Value::String(self.string_value(l));
                rights
                    .iter()
                    .any(|r| compare_atoms(op, &l, &Value::String(self.string_value(r))))
            }),
            (Value::NodeSet(nodes), other) => nodes
                .iter()
                .any(|node| compare_atoms(op, &self.atom_like(node, other), other)),
            (other, Value::NodeSet(nodes)) => nodes
                .iter()
                .any(|node| compare_atoms(op, other, &self.atom_like(node, other))),
            _ => compare_atoms(op, left, right),
        }
    }

    /// A node's string-value, converted to a number when compared to one.
    fn atom_like(&self, node: &XNode, other: &Value) -> Value {
        let text = self.string_value(node);
        match other {
            Value::Number(_) => Value::Number(parse_number(&text)),
            _ => Value::String(text),
        }
    }

    // -----------------------------------------------------------------------
    // Core function library
    // -----------------------------------------------------------------------

    fn call(&self, name: &str, args: &[Expr], focus: &Focus<'_>) -> Result<Value, XPathError> {
        let arity = |expected: &'static str, ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(XPathError::Arity {
                    function: name.to_string(),
                    expected,
                    found: args.len(),
                })
            }
        };
        let arg = |index: usize| self.eval(&args[index], focus);
        // Optional string argument defaulting to the context node's string-value.
        let string_or_context = |args: &[Expr]| -> Result<String, XPathError> {
            match args.first() {
                Some(expr) => Ok(self.string(&self.eval(expr, focus)?)),
                None => Ok(self.string_value(focus.node)),
            }
        };

        let value = match name {
            // [§ 4.1 Node Set Functions](https://www.w3.org/TR/xpath-10/#section-Node-Set-Functions)
            "position" => {
                arity("0", args.is_empty())?;
                Value::Number(to_number(focus.position))
            }
            "last" => {
                arity("0", args.is_empty())?;
                Value::Number(to_number(focus.size))
            }
            "count" => {
                arity("1", args.len() == 1)?;
                let Value::NodeSet(nodes) = arg(0)? else {
                    return Err(XPathError::NotANodeSet);
                };
                Value::Number(to_number(nodes.len()))
            }
            "local-name" | "name" => {
                arity("0 or 1", args.len() <= 1)?;
                let node = match args.first() {
                    None => Some(focus.node.clone()),
                    Some(expr) => match self.eval(expr, focus)? {
                        Value::NodeSet(nodes) => nodes.into_iter().next(),
                        _ => return Err(XPathError::NotANodeSet),
                    },
                };
                Value::String(node.map(|node| self.node_name(&node)).unwrap_or_default())
            }

            // [§ 4.2 String Functions](https://www.w3.org/TR/xpath-10/#section-String-Functions)
            "string" => {
                arity("0 or 1", args.len() <= 1)?;
                Value::String(string_or_context(args)?)
            }
            "concat" => {
                arity("2 or more", args.len() >= 2)?;
                let mut joined = String::new();
                for expr in args {
                    joined.push_str(&self.string(&self.eval(expr, focus)?));
                }
                Value::String(joined)
            }
            "contains" => {
                arity("2", args.len() == 2)?;
                Value::Boolean(self.string(&arg(0)?).contains(&self.string(&arg(1)?)))
            }
            "starts-with" => {
                arity("2", args.len() == 2)?;
                Value::Boolean(self.string(&arg(0)?).starts_with(&self.string(&arg(1)?)))
            }
            "normalize-space" => {
                arity("0 or 1", args.len() <= 1)?;
                let text = string_or_context(args)?;
                Value::String(text.split_whitespace().collect::<Vec<_>>().join(" "))
            }
            "string-length" => {
                arity("0 or 1", args.len() <= 1)?;
                Value::Number(to_number(string_or_context(args)?.chars().count()))
            }
            "substring" => {
                arity("2 or 3", matches!(args.len(), 2 | 3))?;
                let text = self.string(&arg(0)?);
                let start = round(self.number(&arg(1)?));
                let end = match args.get(2) {
                    Some(length) => start + round(self.number(&self.eval(length, focus)?)),
                    None => f64::INFINITY,
                };
                Value::String(substring(&text, start, end))
            }

            // [§ 4.3 Boolean Functions](https://www.w3.org/TR/xpath-10/#section-Boolean-Functions)
            "boolean" => {
                arity("1", args.len() == 1)?;
                Value::Boolean(to_boolean(&arg(0)?))
            }
            "not" => {
                arity("1", args.len() == 1)?;
                Value::Boolean(!to_boolean(&arg(0)?))
            }
            "true" => {
                arity("0", args.is_empty())?;
                Value::Boolean(true)
            }
            "false" => {
                arity("0", args.is_empty())?;
                Value::Boolean(false)
            }

            // [§ 4.4 Number Functions](https://www.w3.org/TR/xpath-10/#section-Number-Functions)
            "number" => {
                arity("0 or 1", args.len() <= 1)?;
                match args.first() {
                    Some(expr) => Value::Number(self.number(&self.eval(expr, focus)?)),
                    None => Value::Number(parse_number(&self.string_value(focus.node))),
                }
            }

            _ => return Err(XPathError::UnknownFunction(name.to_string())),
        };
        Ok(value)
    }

    fn node_name(&self, node: &XNode) -> String {
        match node {
            XNode::Attribute { name, .. } => name.clone(),
            XNode::Tree(id) => self
                .tree
                .as_element(*id)
                .map(|element| element.tag_name.clone())
                .unwrap_or_default(),
        }
    }
}

/// [§ 4.3 `boolean()`](https://www.w3.org/TR/xpath-10/#function-boolean)
fn to_boolean(value: &Value) -> bool {
    match value {
        Value::NodeSet(nodes) => !nodes.is_empty(),
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
    }
}

/// Compare two values of which neither is a node-set.
fn compare_atoms(op: BinaryOp, left: &Value, right: &Value) -> bool {
    let number = |value: &Value| match value {
        Value::Number(n) => *n,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::String(s) => parse_number(s),
        Value::NodeSet(_) => f64::NAN,
    };

    let ordering = match op {
        BinaryOp::Equal | BinaryOp::NotEqual => {
            let equal = match (left, right) {
                (Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
                    to_boolean(left) == to_boolean(right)
                }
                (Value::Number(_), _) | (_, Value::Number(_)) => number(left) == number(right),
                (Value::String(l), Value::String(r)) => l == r,
                _ => false,
            };
            return equal == (op == BinaryOp::Equal);
        }
        _ => number(left).partial_cmp(&number(right)),
    };

    match (op, ordering) {
        (BinaryOp::Less, Some(Ordering::Less))
        | (BinaryOp::LessEqual, Some(Ordering::Less | Ordering::Equal))
        | (BinaryOp::Greater, Some(Ordering::Greater))
        | (BinaryOp::GreaterEqual, Some(Ordering::Greater | Ordering::Equal)) => true,
        _ => false,
    }
}

/// [§ 4.4](https://www.w3.org/TR/xpath-10/#function-number): optional
/// whitespace, optional minus, digits with at most one dot; anything else is
/// `NaN`.
fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let valid = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if valid { trimmed.parse().unwrap_or(f64::NAN) } else { f64::NAN }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        String::from(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// [§ 4.4 `round()`](https://www.w3.org/TR/xpath-10/#function-round): halves
/// round towards positive infinity.
fn round(n: f64) -> f64 {
    (n + 0.5).floor()
}

/// Characters whose 1-based position `p` satisfies `start <= p < end`.
fn substring(text: &str, start: f64, end: f64) -> String {
    text.chars()
        .enumerate()
        .filter(|(index, _)| {
            let position = to_number(index + 1);
            position >= start && position < end
        })
        .map(|(_, c)| c)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn to_number(count: usize) -> f64 {
    count as f64
}
