//! Expression node payloads.

use crate::ast::Node;

/// The right-hand side of a binary or membership expression. A list is
/// only meaningful for array-valued comparisons (`IN`, array equality on
/// the dialects that allow it).
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
    Node(Box<Node>),
    List(Vec<Node>),
}

/// A column reference, optionally table-qualified and aliased. The name
/// `*` stands for the star projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNode {
    pub table: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

impl ColumnNode {
    pub fn new(name: &str) -> Self {
        ColumnNode {
            table: None,
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn qualified(table: &str, name: &str) -> Self {
        ColumnNode {
            table: Some(table.to_string()),
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn is_star(&self) -> bool {
        self.name == "*"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryNode {
    pub left: Box<Node>,
    pub op: String,
    pub right: Rhs,
}

/// Prefix (`(NOT x)`) and postfix (`(x IS NULL)`) unary payloads share a
/// shape; the node kind picks the side the operator renders on.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryNode {
    pub operand: Box<Node>,
    pub op: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryNode {
    pub first: Box<Node>,
    pub op: String,
    pub second: Box<Node>,
    pub separator: String,
    pub third: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InNode {
    pub left: Box<Node>,
    pub right: Rhs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseNode {
    pub whens: Vec<Node>,
    pub thens: Vec<Node>,
    pub else_value: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastNode {
    pub expr: Box<Node>,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtNode {
    pub expr: Box<Node>,
    pub index: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceNode {
    pub expr: Box<Node>,
    pub start: Box<Node>,
    pub end: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallNode {
    pub name: String,
    pub args: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasNode {
    pub expr: Box<Node>,
    pub alias: String,
}
