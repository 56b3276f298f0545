//! The closed set of AST node kinds.
//!
//! Every node the builder can produce is one variant of [`Node`].
//! Construction is permissive: nothing stops an ALTER from holding zero
//! operations or a WHERE from being empty. Malformed shapes are caught
//! at render time instead, so a partially built tree is always a legal
//! value.

use crate::{error::QueryError, value::Value};

pub mod expr;
pub mod ops;
pub mod stmt;

pub use expr::{
    AliasNode, AtNode, BinaryNode, CaseNode, CastNode, ColumnNode, FunctionCallNode, InNode, Rhs,
    SliceNode, TernaryNode, UnaryNode,
};
pub use stmt::{
    ClauseNode, ConflictTarget, CreateIndexNode, CreateViewNode, DropIndexNode, ForeignKeyNode,
    IndexType, IntervalNode, JoinKind, JoinNode, ModifierNode, OnConflictNode, OrderByValueNode,
    OrderDir, QueryNode, TableRef,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Query(QueryNode),
    Subquery(QueryNode),

    // statement clauses
    Select(ClauseNode),
    Insert(ClauseNode),
    Replace(ClauseNode),
    Update(ClauseNode),
    Delete(ClauseNode),
    Create(ClauseNode),
    CreateIndex(CreateIndexNode),
    CreateView(CreateViewNode),
    Drop(ClauseNode),
    DropIndex(DropIndexNode),
    Alter(ClauseNode),
    AddColumn(ClauseNode),
    DropColumn(ClauseNode),
    Rename(ClauseNode),
    RenameColumn(ClauseNode),
    Truncate,
    Indexes,

    // query clauses
    Distinct,
    DistinctOn(ClauseNode),
    Where(ClauseNode),
    From(ClauseNode),
    Join(JoinNode),
    OrderBy(ClauseNode),
    OrderByValue(OrderByValueNode),
    GroupBy(ClauseNode),
    Having(ClauseNode),
    Limit(ModifierNode),
    Offset(ModifierNode),
    Returning(ClauseNode),
    OnConflict(OnConflictNode),
    OnDuplicate(ClauseNode),
    AsOf(Box<Node>),
    ForeignKey(ForeignKeyNode),
    Interval(IntervalNode),

    // prefix markers
    IfExists,
    IfNotExists,
    OrIgnore,

    // drop/lock modifiers
    Cascade,
    Restrict,
    ForUpdate,
    ForShare,

    // expressions
    Binary(BinaryNode),
    PrefixUnary(UnaryNode),
    PostfixUnary(UnaryNode),
    Ternary(TernaryNode),
    In(InNode),
    NotIn(InNode),
    Case(CaseNode),
    Cast(CastNode),
    At(AtNode),
    Slice(SliceNode),
    Column(ColumnNode),
    Table(TableRef),
    FunctionCall(FunctionCallNode),
    ArrayCall(ClauseNode),
    RowCall(ClauseNode),
    Parameter(Value),
    Literal(String),
    Text(String),
    Alias(AliasNode),
}

impl Node {
    /// The kind tag, used in error messages and logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Query(_) => "QUERY",
            Node::Subquery(_) => "SUBQUERY",
            Node::Select(_) => "SELECT",
            Node::Insert(_) => "INSERT",
            Node::Replace(_) => "REPLACE",
            Node::Update(_) => "UPDATE",
            Node::Delete(_) => "DELETE",
            Node::Create(_) => "CREATE",
            Node::CreateIndex(_) => "CREATE INDEX",
            Node::CreateView(_) => "CREATE VIEW",
            Node::Drop(_) => "DROP",
            Node::DropIndex(_) => "DROP INDEX",
            Node::Alter(_) => "ALTER",
            Node::AddColumn(_) => "ADD COLUMN",
            Node::DropColumn(_) => "DROP COLUMN",
            Node::Rename(_) => "RENAME",
            Node::RenameColumn(_) => "RENAME COLUMN",
            Node::Truncate => "TRUNCATE",
            Node::Indexes => "INDEXES",
            Node::Distinct => "DISTINCT",
            Node::DistinctOn(_) => "DISTINCT ON",
            Node::Where(_) => "WHERE",
            Node::From(_) => "FROM",
            Node::Join(_) => "JOIN",
            Node::OrderBy(_) => "ORDER BY",
            Node::OrderByValue(_) => "ORDER BY VALUE",
            Node::GroupBy(_) => "GROUP BY",
            Node::Having(_) => "HAVING",
            Node::Limit(_) => "LIMIT",
            Node::Offset(_) => "OFFSET",
            Node::Returning(_) => "RETURNING",
            Node::OnConflict(_) => "ON CONFLICT",
            Node::OnDuplicate(_) => "ON DUPLICATE",
            Node::AsOf(_) => "AS OF",
            Node::ForeignKey(_) => "FOREIGN KEY",
            Node::Interval(_) => "INTERVAL",
            Node::IfExists => "IF EXISTS",
            Node::IfNotExists => "IF NOT EXISTS",
            Node::OrIgnore => "OR IGNORE",
            Node::Cascade => "CASCADE",
            Node::Restrict => "RESTRICT",
            Node::ForUpdate => "FOR UPDATE",
            Node::ForShare => "FOR SHARE",
            Node::Binary(_) => "BINARY",
            Node::PrefixUnary(_) => "PREFIX UNARY",
            Node::PostfixUnary(_) => "POSTFIX UNARY",
            Node::Ternary(_) => "TERNARY",
            Node::In(_) => "IN",
            Node::NotIn(_) => "NOT IN",
            Node::Case(_) => "CASE",
            Node::Cast(_) => "CAST",
            Node::At(_) => "AT",
            Node::Slice(_) => "SLICE",
            Node::Column(_) => "COLUMN",
            Node::Table(_) => "TABLE",
            Node::FunctionCall(_) => "FUNCTION CALL",
            Node::ArrayCall(_) => "ARRAY CALL",
            Node::RowCall(_) => "ROW CALL",
            Node::Parameter(_) => "PARAMETER",
            Node::Literal(_) => "LITERAL",
            Node::Text(_) => "TEXT",
            Node::Alias(_) => "ALIAS",
        }
    }

    /// Appends a child to a clause-like node. Bare strings normalize to
    /// TEXT nodes. Leaf kinds cannot hold children and fail.
    pub fn add(&mut self, child: impl Into<Node>) -> Result<&mut Self, QueryError> {
        let child = child.into();
        match self.children_mut() {
            Some(children) => {
                children.push(child);
                Ok(self)
            }
            None => Err(QueryError::InvalidChild(format!(
                "{} nodes do not hold children",
                self.kind()
            ))),
        }
    }

    pub fn add_all(&mut self, children: Vec<Node>) -> Result<&mut Self, QueryError> {
        for child in children {
            self.add(child)?;
        }
        Ok(self)
    }

    /// Inserts a child at position 0, used for the IF EXISTS,
    /// IF NOT EXISTS and OR IGNORE prefix markers.
    pub fn prepend(&mut self, child: impl Into<Node>) -> Result<&mut Self, QueryError> {
        let child = child.into();
        match self.children_mut() {
            Some(children) => {
                children.insert(0, child);
                Ok(self)
            }
            None => Err(QueryError::InvalidChild(format!(
                "{} nodes do not hold children",
                self.kind()
            ))),
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Query(q) | Node::Subquery(q) => Some(&mut q.nodes),
            Node::Select(n)
            | Node::Insert(n)
            | Node::Replace(n)
            | Node::Update(n)
            | Node::Delete(n)
            | Node::Create(n)
            | Node::Drop(n)
            | Node::Alter(n)
            | Node::AddColumn(n)
            | Node::DropColumn(n)
            | Node::Rename(n)
            | Node::RenameColumn(n)
            | Node::DistinctOn(n)
            | Node::Where(n)
            | Node::From(n)
            | Node::OrderBy(n)
            | Node::GroupBy(n)
            | Node::Having(n)
            | Node::Returning(n)
            | Node::OnDuplicate(n)
            | Node::ArrayCall(n)
            | Node::RowCall(n) => Some(&mut n.children),
            _ => None,
        }
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        Node::Parameter(v)
    }
}

impl From<QueryNode> for Node {
    fn from(q: QueryNode) -> Self {
        Node::Query(q)
    }
}

impl From<TableRef> for Node {
    fn from(t: TableRef) -> Self {
        Node::Table(t)
    }
}

impl From<ColumnNode> for Node {
    fn from(c: ColumnNode) -> Self {
        Node::Column(c)
    }
}

// Bare text normalizes to a TEXT node, matching the append contract.
impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_normalizes_text() {
        let mut create = Node::Create(ClauseNode::default());
        create.add("\"id\" INTEGER PRIMARY KEY").unwrap();
        match &create {
            Node::Create(n) => {
                assert_eq!(n.children.len(), 1);
                assert_eq!(
                    n.children[0],
                    Node::Text("\"id\" INTEGER PRIMARY KEY".to_string())
                );
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_prepend_inserts_marker_first() {
        let mut drop = Node::Drop(ClauseNode::with(vec![Node::Cascade]));
        drop.prepend(Node::IfExists).unwrap();
        match &drop {
            Node::Drop(n) => assert_eq!(n.children[0], Node::IfExists),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_add_to_leaf_fails() {
        let mut param = Node::Parameter(Value::Int(1));
        let err = param.add(Node::Distinct).unwrap_err();
        assert!(matches!(err, QueryError::InvalidChild(_)));
    }
}
