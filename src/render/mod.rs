//! Rendering state and the public entry points.
//!
//! Every render call allocates its own [`Renderer`]; nothing is ever
//! stored on the tree, so one immutable tree can be rendered under any
//! number of dialects, concurrently or not, without interference.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    ast::{stmt::TableRef, Node},
    dialect::{self, Dialect},
    error::QueryError,
    value::Value,
};

/// The clause currently being rendered. Context decides details like
/// whether a column renders its alias (SELECT targets only) or its
/// table qualifier (suppressed in INSERT column lists and SET clauses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    None,
    Select,
    From,
    Insert,
    Update,
    Alter,
}

/// Per-invocation rendering state.
pub struct Renderer<'a> {
    pub dialect: &'a dyn Dialect,
    pub inline: bool,
    pub params: Vec<Value>,
    /// The table of the query currently being rendered; subqueries swap
    /// it for the duration of their own pass.
    pub table: Option<TableRef>,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Renderer {
            dialect,
            inline: false,
            params: Vec::new(),
            table: None,
        }
    }

    pub fn new_inline(dialect: &'a dyn Dialect) -> Self {
        Renderer {
            dialect,
            inline: true,
            params: Vec::new(),
            table: None,
        }
    }

    /// Registers a parameter value and returns the text standing in for
    /// it: a placeholder in parameterized mode, the encoded literal in
    /// inline mode.
    pub fn add_param(&mut self, value: &Value) -> Result<String, QueryError> {
        if self.inline {
            self.dialect.encode_value(value)
        } else {
            self.params.push(value.clone());
            Ok(self.dialect.placeholder(self.params.len()))
        }
    }
}

/// A parameterized statement: text with placeholders plus the bind
/// values in placeholder order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedQuery {
    pub text: String,
    pub values: Vec<Value>,
}

/// A [`RenderedQuery`] tagged with a caller-chosen name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    pub text: String,
    pub values: Vec<Value>,
}

/// Renders a tree as a parameterized query under the named dialect
/// (default `postgres`).
pub fn render(node: &Node, dialect_name: Option<&str>) -> Result<RenderedQuery, QueryError> {
    let dialect = dialect::from_name(dialect_name.unwrap_or(dialect::DEFAULT_DIALECT))?;
    render_with(dialect.as_ref(), node)
}

/// Renders a tree with a pre-configured dialect instance.
pub fn render_with(dialect: &dyn Dialect, node: &Node) -> Result<RenderedQuery, QueryError> {
    debug!(dialect = dialect.name(), kind = node.kind(), "rendering query");
    let mut renderer = Renderer::new(dialect);
    let text = render_root(node, &mut renderer)?;
    Ok(RenderedQuery {
        text,
        values: renderer.params,
    })
}

/// Renders a tree as a single SQL string with all values inlined.
pub fn render_inline(node: &Node, dialect_name: Option<&str>) -> Result<String, QueryError> {
    let dialect = dialect::from_name(dialect_name.unwrap_or(dialect::DEFAULT_DIALECT))?;
    render_inline_with(dialect.as_ref(), node)
}

pub fn render_inline_with(dialect: &dyn Dialect, node: &Node) -> Result<String, QueryError> {
    debug!(dialect = dialect.name(), kind = node.kind(), "rendering inline");
    let mut renderer = Renderer::new_inline(dialect);
    render_root(node, &mut renderer)
}

/// Same as [`render`] plus a name tag; the name must be non-empty.
pub fn to_named_query(
    node: &Node,
    name: &str,
    dialect_name: Option<&str>,
) -> Result<NamedQuery, QueryError> {
    if name.is_empty() {
        return Err(QueryError::EmptyName);
    }
    let rendered = render(node, dialect_name)?;
    Ok(NamedQuery {
        name: name.to_string(),
        text: rendered.text,
        values: rendered.values,
    })
}

fn render_root(node: &Node, r: &mut Renderer) -> Result<String, QueryError> {
    let dialect = r.dialect;
    match node {
        Node::Query(q) | Node::Subquery(q) => {
            let tokens = dialect.visit_query(q, r)?;
            Ok(tokens.join(" "))
        }
        other => dialect.visit(other, r, Clause::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ops::Expression, stmt::QueryNode};

    fn users() -> QueryNode {
        QueryNode::new(TableRef::new("users"))
    }

    #[test]
    fn test_default_dialect_is_postgres() {
        let query = Node::Query(users().select(vec![users().column("id")]));
        let rendered = render(&query, None).unwrap();
        assert_eq!(rendered.text, r#"SELECT "users"."id" FROM "users""#);
        assert!(rendered.values.is_empty());
    }

    #[test]
    fn test_unknown_dialect_fails() {
        let query = Node::Query(users());
        let err = render(&query, Some("db2")).unwrap_err();
        assert!(matches!(err, QueryError::UnknownDialect(name) if name == "db2"));
    }

    #[test]
    fn test_named_query_requires_name() {
        let query = Node::Query(users());
        let err = to_named_query(&query, "", None).unwrap_err();
        assert!(matches!(err, QueryError::EmptyName));

        let named = to_named_query(&query, "all_users", None).unwrap();
        assert_eq!(named.name, "all_users");
        assert_eq!(named.text, r#"SELECT * FROM "users""#);
    }

    #[test]
    fn test_parameter_order_matches_placeholders() {
        let q = users();
        let query = Node::Query(
            users()
                .select(vec![q.column("id")])
                .filter(q.column("age").gt(21).and(q.column("name").like("a%"))),
        );
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"SELECT "users"."id" FROM "users" WHERE (("users"."age" > $1) AND ("users"."name" LIKE $2))"#
        );
        assert_eq!(
            rendered.values,
            vec![Value::Int(21), Value::String("a%".to_string())]
        );
    }

    #[test]
    fn test_inline_mode_collects_no_values() {
        let q = users();
        let query = Node::Query(users().select(vec![q.column("id")]).filter(q.column("age").gt(21)));
        let sql = render_inline(&query, None).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "users"."id" FROM "users" WHERE ("users"."age" > 21)"#
        );
        assert!(!sql.as_str().contains('$'));
    }

    #[test]
    fn test_rendering_is_repeatable_across_dialects() {
        let q = users();
        let query = Node::Query(users().select(vec![q.column("id")]).filter(q.column("age").gt(21)));
        let first = render(&query, Some("postgres")).unwrap();
        let _mysql = render(&query, Some("mysql")).unwrap();
        let _mssql = render(&query, Some("mssql")).unwrap();
        let again = render(&query, Some("postgres")).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_bare_expression_renders_standalone() {
        let q = users();
        let expr = q.column("age").equals(30);
        let rendered = render(&expr, None).unwrap();
        assert_eq!(rendered.text, r#"("users"."age" = $1)"#);
        assert_eq!(rendered.values, vec![Value::Int(30)]);
    }
}
