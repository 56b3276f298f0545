//! The `Dialect` trait and the dialect name registry.
//!
//! Each visit method carries a default body implementing the base
//! (SQL-92-ish, Postgres-flavoured) rule by delegating to the free
//! functions in [`base`]; a dialect overrides only its deviations and
//! can still call the base rule the way a subclass calls `super`.

use crate::{
    ast::{
        expr::{BinaryNode, CaseNode, FunctionCallNode, InNode},
        stmt::{ClauseNode, CreateIndexNode, DropIndexNode, IntervalNode, ModifierNode, QueryNode},
        Node,
    },
    error::QueryError,
    render::{Clause, Renderer},
    value::Value,
};

pub mod base;
pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

pub use mssql::Mssql;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::{NullOrder, Postgres};
pub use sqlite::Sqlite;

pub const DEFAULT_DIALECT: &str = "postgres";

/// Resolves a dialect by registry name.
pub fn from_name(name: &str) -> Result<Box<dyn Dialect>, QueryError> {
    match name {
        "postgres" => Ok(Box::new(Postgres::default())),
        "mysql" => Ok(Box::new(MySql)),
        "sqlite" => Ok(Box::new(Sqlite::default())),
        "mssql" => Ok(Box::new(Mssql::default())),
        "oracle" => Ok(Box::new(Oracle)),
        other => Err(QueryError::UnknownDialect(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Limit,
    Offset,
}

/// OFFSET/FETCH values attached to an ORDER BY clause by the MSSQL
/// pagination rewrite.
#[derive(Clone, Copy)]
pub struct OrderByPage<'n> {
    pub offset: &'n ModifierNode,
    pub fetch: Option<&'n ModifierNode>,
}

/// Pagination rewrite state for one render call. Built by a dialect's
/// `visit_query` before emission and consumed by the base query loop;
/// never stored on the tree.
#[derive(Default, Clone, Copy)]
pub struct Hoist<'n> {
    /// LIMIT turned into TOP(n) on the SELECT clause.
    pub top: Option<&'n ModifierNode>,
    /// OFFSET (and optionally LIMIT) attached to the ORDER BY clause.
    pub page: Option<OrderByPage<'n>>,
    /// When set, LIMIT/OFFSET nodes are skipped during normal emission.
    pub active: bool,
}

pub trait Dialect: Send + Sync {
    /// Display name, used in error messages and logging.
    fn name(&self) -> &'static str;

    /// Wraps an identifier in the dialect's quote characters.
    fn quote(&self, ident: &str) -> String {
        format!(r#""{ident}""#)
    }

    /// The placeholder for the 1-based parameter index.
    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    /// Separator between an expression and its alias.
    fn alias_sep(&self) -> &'static str {
        " AS "
    }

    /// Extra ORDER BY suffix (`NULLS FIRST`/`NULLS LAST`) when the
    /// dialect supports configurable null ordering.
    fn null_order_suffix(&self) -> Option<&'static str> {
        None
    }

    /// Renders an expression node to text.
    fn visit(&self, node: &Node, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
        base::visit(node, r, ctx)
    }

    /// Renders a whole statement to its token list. Tokens are joined
    /// with single spaces at the end; statement rewrites that reorder
    /// emitted clauses operate on this list.
    fn visit_query(&self, q: &QueryNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::query(q, r)
    }

    fn visit_select(
        &self,
        n: &ClauseNode,
        top: Option<&ModifierNode>,
        r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        base::select(n, top, r)
    }

    fn visit_insert(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::insert(n, "INSERT", r)
    }

    fn visit_replace(&self, _n: &ClauseNode, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "REPLACE"))
    }

    fn visit_update(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::update(n, r)
    }

    fn visit_delete(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::delete(n, r)
    }

    fn visit_create(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::create(n, r)
    }

    fn visit_drop(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::drop_table(n, r)
    }

    fn visit_alter(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::alter(n, r)
    }

    fn visit_truncate(&self, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::truncate(r)
    }

    /// Index listing for the current table. The base dialect leaves
    /// this abstract.
    fn visit_indexes(&self, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "index listing"))
    }

    fn visit_create_index(
        &self,
        n: &CreateIndexNode,
        r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        base::create_index(n, r)
    }

    fn visit_drop_index(
        &self,
        n: &DropIndexNode,
        r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        base::drop_index(n, r)
    }

    fn visit_if_not_exists_index(&self) -> Result<Vec<String>, QueryError> {
        Ok(vec!["IF NOT EXISTS".to_string()])
    }

    fn visit_if_exists_index(&self) -> Result<Vec<String>, QueryError> {
        Ok(vec!["IF EXISTS".to_string()])
    }

    fn visit_order_by(
        &self,
        n: &ClauseNode,
        page: Option<OrderByPage<'_>>,
        r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        base::order_by(n, page, r)
    }

    fn visit_modifier(
        &self,
        kind: ModifierKind,
        m: &ModifierNode,
        r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        base::modifier(kind, m, r)
    }

    fn visit_binary(
        &self,
        b: &BinaryNode,
        r: &mut Renderer,
        ctx: Clause,
    ) -> Result<String, QueryError> {
        base::binary(b, r, ctx)
    }

    fn visit_in(
        &self,
        n: &InNode,
        negated: bool,
        r: &mut Renderer,
        ctx: Clause,
    ) -> Result<String, QueryError> {
        base::in_list(n, negated, r, ctx)
    }

    fn visit_case(&self, c: &CaseNode, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
        base::case(c, r, ctx)
    }

    /// Renders one WHEN operand of a CASE expression. The dialects
    /// without boolean literals in WHEN position substitute `1=1`/`0=1`
    /// for boolean parameters here.
    fn case_when_value(&self, node: &Node, r: &mut Renderer) -> Result<String, QueryError> {
        base::visit(node, r, Clause::None)
    }

    fn visit_function_call(
        &self,
        f: &FunctionCallNode,
        r: &mut Renderer,
        ctx: Clause,
    ) -> Result<String, QueryError> {
        base::function_call(f, r, ctx)
    }

    fn visit_parameter(&self, v: &Value, r: &mut Renderer) -> Result<String, QueryError> {
        r.add_param(v)
    }

    /// Encodes a value as an inline literal.
    fn encode_value(&self, v: &Value) -> Result<String, QueryError> {
        base::encode_value(v)
    }

    fn visit_returning(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::returning(n, r)
    }

    fn visit_on_conflict(
        &self,
        n: &crate::ast::stmt::OnConflictNode,
        r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        base::on_conflict(n, r)
    }

    fn visit_on_duplicate(
        &self,
        _n: &ClauseNode,
        _r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "ON DUPLICATE KEY UPDATE"))
    }

    fn visit_as_of(&self, expr: &Node, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::as_of("AS OF SYSTEM TIME", expr, r)
    }

    fn visit_interval(&self, i: &IntervalNode) -> Result<String, QueryError> {
        base::interval(i)
    }

    fn visit_or_ignore(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "OR IGNORE"))
    }

    fn visit_cascade(&self) -> Result<Vec<String>, QueryError> {
        Ok(vec!["CASCADE".to_string()])
    }

    fn visit_restrict(&self) -> Result<Vec<String>, QueryError> {
        Ok(vec!["RESTRICT".to_string()])
    }

    fn visit_for_update(&self) -> Result<Vec<String>, QueryError> {
        Ok(vec!["FOR UPDATE".to_string()])
    }

    fn visit_for_share(&self) -> Result<Vec<String>, QueryError> {
        Ok(vec!["FOR SHARE".to_string()])
    }
}
