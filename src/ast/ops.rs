//! Value-expression composition.
//!
//! Every node usable as a scalar or boolean operand exposes the same
//! closed set of composition operations through [`Expression`]. Each
//! operation returns a new node; receivers are consumed, never mutated.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    ast::{
        expr::{
            AliasNode, AtNode, BinaryNode, CaseNode, CastNode, InNode, Rhs, SliceNode, TernaryNode,
            UnaryNode,
        },
        stmt::{OrderByValueNode, OrderDir, QueryNode},
        Node,
    },
    error::QueryError,
    value::Value,
};

/// One or many operands. Bare values auto-wrap as PARAMETER nodes;
/// nodes and subqueries pass through.
#[derive(Debug, Clone)]
pub enum Operand {
    Single(Node),
    List(Vec<Node>),
}

impl Operand {
    /// Rejects lists where a single value is required.
    pub fn into_single(self) -> Result<Node, QueryError> {
        match self {
            Operand::Single(node) => Ok(node),
            Operand::List(_) => Err(QueryError::ExpectedSingleValue),
        }
    }

    /// Rejects single values where an array is required.
    pub fn into_list(self) -> Result<Vec<Node>, QueryError> {
        match self {
            Operand::Single(_) => Err(QueryError::ExpectedArray),
            Operand::List(nodes) => Ok(nodes),
        }
    }

    pub fn into_rhs(self) -> Rhs {
        match self {
            Operand::Single(node) => Rhs::Node(Box::new(node)),
            Operand::List(nodes) => Rhs::List(nodes),
        }
    }

    /// A single node, or a ROW CALL wrapping the list. Used where a
    /// modifier count or index wants exactly one node but the call site
    /// accepts the generic operand shape.
    pub fn into_node(self) -> Node {
        match self {
            Operand::Single(node) => node,
            Operand::List(nodes) => Node::RowCall(crate::ast::stmt::ClauseNode::with(nodes)),
        }
    }
}

impl From<Node> for Operand {
    fn from(node: Node) -> Self {
        Operand::Single(node)
    }
}

impl From<QueryNode> for Operand {
    fn from(q: QueryNode) -> Self {
        Operand::Single(Node::Subquery(q))
    }
}

impl From<Vec<Node>> for Operand {
    fn from(nodes: Vec<Node>) -> Self {
        Operand::List(nodes)
    }
}

macro_rules! scalar_operand {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Operand {
                fn from(v: $t) -> Self {
                    Operand::Single(Node::Parameter(Value::from(v)))
                }
            }
            impl From<Vec<$t>> for Operand {
                fn from(vs: Vec<$t>) -> Self {
                    Operand::List(
                        vs.into_iter()
                            .map(|v| Node::Parameter(Value::from(v)))
                            .collect(),
                    )
                }
            }
        )*
    };
}

scalar_operand!(bool, i32, i64, f64, &str, String, NaiveDate, DateTime<Utc>, Uuid);

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Single(Node::Parameter(v))
    }
}

impl From<Vec<Value>> for Operand {
    fn from(vs: Vec<Value>) -> Self {
        Operand::List(vs.into_iter().map(Node::Parameter).collect())
    }
}

fn binary(left: impl Into<Node>, op: &str, rhs: impl Into<Operand>) -> Node {
    Node::Binary(BinaryNode {
        left: Box::new(left.into()),
        op: op.to_string(),
        right: rhs.into().into_rhs(),
    })
}

fn postfix(operand: impl Into<Node>, op: &str) -> Node {
    Node::PostfixUnary(UnaryNode {
        operand: Box::new(operand.into()),
        op: op.to_string(),
    })
}

fn ternary(
    first: impl Into<Node>,
    op: &str,
    second: impl Into<Operand>,
    separator: &str,
    third: impl Into<Operand>,
) -> Result<Node, QueryError> {
    Ok(Node::Ternary(TernaryNode {
        first: Box::new(first.into()),
        op: op.to_string(),
        second: Box::new(second.into().into_single()?),
        separator: separator.to_string(),
        third: Box::new(third.into().into_single()?),
    }))
}

macro_rules! binary_ops {
    ($( $method:ident => $op:expr ),* $(,)?) => {
        $(
            fn $method(self, rhs: impl Into<Operand>) -> Node {
                binary(self, $op, rhs)
            }
        )*
    };
}

/// The value-expression composition set, available on every node (and
/// on anything convertible to one).
pub trait Expression: Into<Node> + Sized {
    binary_ops! {
        equals => "=",
        not_equals => "<>",
        gt => ">",
        gte => ">=",
        lt => "<",
        lte => "<=",
        like => "LIKE",
        not_like => "NOT LIKE",
        ilike => "ILIKE",
        not_ilike => "NOT ILIKE",
        regex => "~",
        iregex => "~*",
        not_regex => "!~",
        not_iregex => "!~*",
        regexp => "REGEXP",
        match_ => "@@",
        plus => "+",
        minus => "-",
        multiply => "*",
        divide => "/",
        modulo => "%",
        left_shift => "<<",
        right_shift => ">>",
        bitwise_and => "&",
        bitwise_or => "|",
        bitwise_xor => "#",
        concat => "||",
        key => "->",
        key_text => "->>",
        path => "#>",
        path_text => "#>>",
        contains => "@>",
        contained_by => "<@",
        overlap => "&&",
        and => "AND",
        or => "OR",
    }

    fn is_null(self) -> Node {
        postfix(self, "IS NULL")
    }

    fn is_not_null(self) -> Node {
        postfix(self, "IS NOT NULL")
    }

    fn in_(self, rhs: impl Into<Operand>) -> Node {
        Node::In(InNode {
            left: Box::new(self.into()),
            right: rhs.into().into_rhs(),
        })
    }

    fn not_in(self, rhs: impl Into<Operand>) -> Node {
        Node::NotIn(InNode {
            left: Box::new(self.into()),
            right: rhs.into().into_rhs(),
        })
    }

    fn between(self, low: impl Into<Operand>, high: impl Into<Operand>) -> Result<Node, QueryError> {
        ternary(self, "BETWEEN", low, "AND", high)
    }

    fn not_between(
        self,
        low: impl Into<Operand>,
        high: impl Into<Operand>,
    ) -> Result<Node, QueryError> {
        ternary(self, "NOT BETWEEN", low, "AND", high)
    }

    fn cast(self, data_type: &str) -> Node {
        Node::Cast(CastNode {
            expr: Box::new(self.into()),
            data_type: data_type.to_string(),
        })
    }

    fn at(self, index: impl Into<Operand>) -> Result<Node, QueryError> {
        Ok(Node::At(AtNode {
            expr: Box::new(self.into()),
            index: Box::new(index.into().into_single()?),
        }))
    }

    fn slice(
        self,
        start: impl Into<Operand>,
        end: impl Into<Operand>,
    ) -> Result<Node, QueryError> {
        Ok(Node::Slice(SliceNode {
            expr: Box::new(self.into()),
            start: Box::new(start.into().into_single()?),
            end: Box::new(end.into().into_single()?),
        }))
    }

    /// Generic operator escape hatch. Arity is inferred from the operand
    /// count: zero operands make a postfix unary, one makes a binary,
    /// two with a separator make a ternary. Anything else fails with
    /// `InvalidArity`.
    fn custom_op(
        self,
        operator: &str,
        separator: Option<&str>,
        mut operands: Vec<Operand>,
    ) -> Result<Node, QueryError> {
        match (operands.len(), separator) {
            (0, _) => Ok(postfix(self, operator)),
            (1, _) => Ok(binary(self, operator, operands.remove(0))),
            (2, Some(sep)) => {
                let third = operands.remove(1);
                let second = operands.remove(0);
                ternary(self, operator, second, sep, third)
            }
            (n, _) => Err(QueryError::InvalidArity(n)),
        }
    }

    /// A prefix operator applied to the receiver, e.g. EXISTS.
    fn prefix_op(self, operator: &str) -> Node {
        Node::PrefixUnary(UnaryNode {
            operand: Box::new(self.into()),
            op: operator.to_string(),
        })
    }

    fn descending(self) -> Node {
        Node::OrderByValue(OrderByValueNode {
            expr: Box::new(self.into()),
            direction: Some(OrderDir::Desc),
        })
    }

    fn ascending(self) -> Node {
        Node::OrderByValue(OrderByValueNode {
            expr: Box::new(self.into()),
            direction: Some(OrderDir::Asc),
        })
    }

    fn alias(self, alias: &str) -> Node {
        Node::Alias(AliasNode {
            expr: Box::new(self.into()),
            alias: alias.to_string(),
        })
    }
}

impl<T: Into<Node>> Expression for T {}

/// A searched CASE expression. The WHEN and THEN arguments must both be
/// arrays; length mismatches are caught at render time.
pub fn case(
    whens: impl Into<Operand>,
    thens: impl Into<Operand>,
    else_value: Option<Node>,
) -> Result<Node, QueryError> {
    Ok(Node::Case(CaseNode {
        whens: whens.into().into_list()?,
        thens: thens.into().into_list()?,
        else_value: else_value.map(Box::new),
    }))
}
