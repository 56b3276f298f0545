//! SQL AST builder with per-dialect rendering.
//!
//! Statements are built as immutable trees of [`Node`] values and
//! rendered to parameterized SQL for PostgreSQL, MySQL, SQLite,
//! Microsoft SQL Server or Oracle. The tree carries no dialect state,
//! so one tree renders under any number of dialects.
//!
//! ```
//! use sqlgen::{query, render, Expression, Node};
//!
//! let users = query("users");
//! let stmt = Node::Query(
//!     query("users")
//!         .select(vec![users.column("id")])
//!         .filter(users.column("age").gte(18)),
//! );
//!
//! let rendered = render(&stmt, Some("postgres")).unwrap();
//! assert_eq!(
//!     rendered.text,
//!     r#"SELECT "users"."id" FROM "users" WHERE ("users"."age" >= $1)"#
//! );
//! ```

pub mod ast;
pub mod dialect;
pub mod error;
pub mod macros;
pub mod render;
pub mod value;

pub use ast::{
    ops::{case, Expression, Operand},
    ColumnNode, FunctionCallNode, Node, QueryNode, TableRef,
};
pub use dialect::{Dialect, Mssql, MySql, NullOrder, Oracle, Postgres, Sqlite};
pub use error::QueryError;
pub use render::{
    render, render_inline, render_inline_with, render_with, to_named_query, Clause, NamedQuery,
    RenderedQuery, Renderer,
};
pub use value::Value;

/// A statement builder rooted at the named table.
pub fn query(table: &str) -> QueryNode {
    QueryNode::new(TableRef::new(table))
}

/// A table reference.
pub fn table(name: &str) -> TableRef {
    TableRef::new(name)
}

/// An unqualified column node.
pub fn column(name: &str) -> Node {
    Node::Column(ColumnNode::new(name))
}

/// The bare star projection.
pub fn star() -> Node {
    Node::Column(ColumnNode::new("*"))
}

/// A parameter node capturing the value.
pub fn param(v: impl Into<Value>) -> Node {
    Node::Parameter(v.into())
}

/// Raw SQL text spliced into the statement unquoted.
pub fn text(s: &str) -> Node {
    Node::Text(s.to_string())
}

/// A function call node.
pub fn func(name: &str, args: Vec<Node>) -> Node {
    Node::FunctionCall(FunctionCallNode {
        name: name.to_string(),
        args,
    })
}
