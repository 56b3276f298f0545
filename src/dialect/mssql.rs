//! Microsoft SQL Server. Bracket quoting, `@n` placeholders, TOP and
//! OFFSET/FETCH pagination, existence guards against
//! INFORMATION_SCHEMA, sp_rename for renames.

use tracing::trace;

use crate::{
    ast::{
        expr::{BinaryNode, FunctionCallNode, Rhs},
        stmt::{ClauseNode, QueryNode},
        Node,
    },
    dialect::{base, base::AlterOp, Dialect, Hoist, OrderByPage},
    error::QueryError,
    render::{Clause, Renderer},
    value::Value,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Mssql {
    /// Emit `?` placeholders instead of `@n`, for ODBC-style drivers.
    pub question_mark_parameter_placeholder: bool,
}

impl Dialect for Mssql {
    fn name(&self) -> &'static str {
        "MSSQL"
    }

    fn quote(&self, ident: &str) -> String {
        format!("[{ident}]")
    }

    fn placeholder(&self, index: usize) -> String {
        if self.question_mark_parameter_placeholder {
            "?".to_string()
        } else {
            format!("@{index}")
        }
    }

    /// LIMIT/OFFSET have no direct form. A lone LIMIT becomes TOP(n) on
    /// the SELECT clause; an OFFSET moves both values onto the ORDER BY
    /// clause as OFFSET .. ROWS FETCH NEXT .. ROWS ONLY, and without an
    /// ORDER BY the statement cannot be expressed at all.
    fn visit_query(&self, q: &QueryNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        let mut limit = None;
        let mut offset = None;
        let mut has_order_by = false;
        for node in &q.nodes {
            match node {
                Node::Limit(m) => limit = Some(m),
                Node::Offset(m) => offset = Some(m),
                Node::OrderBy(_) => has_order_by = true,
                _ => {}
            }
        }
        let hoist = if let Some(offset) = offset {
            if !has_order_by {
                return Err(QueryError::MissingOrderBy);
            }
            trace!("hoisting OFFSET/LIMIT onto the ORDER BY clause");
            Hoist {
                top: None,
                page: Some(OrderByPage {
                    offset,
                    fetch: limit,
                }),
                active: true,
            }
        } else if let Some(limit) = limit {
            trace!("hoisting LIMIT into TOP on the SELECT clause");
            Hoist {
                top: Some(limit),
                page: None,
                active: true,
            }
        } else {
            Hoist::default()
        };
        base::query_with(q, r, &hoist)
    }

    fn visit_create(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        if !n.children.iter().any(|c| matches!(c, Node::IfNotExists)) {
            return base::create(n, r);
        }
        let inner = ClauseNode::with(
            n.children
                .iter()
                .filter(|c| !matches!(c, Node::IfNotExists))
                .cloned()
                .collect(),
        );
        let create = base::create(&inner, r)?.join(" ");
        let table = base::current_table(r)?;
        Ok(vec![format!(
            "IF NOT EXISTS(SELECT * FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = '{}') BEGIN {} END",
            table.name, create
        )])
    }

    fn visit_drop(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        if !n.children.iter().any(|c| matches!(c, Node::IfExists)) {
            return base::drop_table(n, r);
        }
        let table = base::current_table(r)?;
        let table = base::table_text(&table, r);
        Ok(vec![format!(
            "IF EXISTS(SELECT * FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = {table}) BEGIN DROP TABLE {table} END"
        )])
    }

    fn visit_alter(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        let table = base::current_table(r)?;
        let table = base::table_text(&table, r);
        match base::alter_op(n, self.name())? {
            AlterOp::AddColumn(items) => {
                let defs = base::alter_items(&items, r)?;
                Ok(vec![
                    "ALTER TABLE".to_string(),
                    table,
                    format!("ADD {}", defs.join(", ")),
                ])
            }
            AlterOp::DropColumn(items) => {
                let names = base::alter_items(&items, r)?;
                Ok(vec![
                    "ALTER TABLE".to_string(),
                    table,
                    format!("DROP COLUMN {}", names.join(", ")),
                ])
            }
            AlterOp::Rename(items) => {
                let names = base::alter_items(&items, r)?;
                match names.as_slice() {
                    [new_name] => Ok(vec![
                        "EXEC sp_rename".to_string(),
                        format!("{table}, {new_name}"),
                    ]),
                    _ => Err(QueryError::InvalidChild(
                        "RENAME takes exactly one new name".to_string(),
                    )),
                }
            }
            AlterOp::RenameColumn(items) => {
                let names = base::alter_items(&items, r)?;
                match names.as_slice() {
                    [old, new] => Ok(vec![
                        "EXEC sp_rename".to_string(),
                        format!("'{table}.{old}', {new}, 'COLUMN'"),
                    ]),
                    _ => Err(QueryError::InvalidChild(
                        "RENAME COLUMN takes an old and a new name".to_string(),
                    )),
                }
            }
        }
    }

    fn visit_drop_index(
        &self,
        n: &crate::ast::stmt::DropIndexNode,
        r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        let table = base::current_table(r)?;
        let mut tokens = vec!["DROP INDEX".to_string()];
        if n.if_exists {
            tokens.extend(self.visit_if_exists_index()?);
        }
        tokens.push(self.quote(&n.name));
        tokens.push("ON".to_string());
        tokens.push(base::table_text(&table, r));
        Ok(tokens)
    }

    fn visit_if_not_exists_index(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "IF NOT EXISTS on indexes"))
    }

    fn visit_as_of(&self, _expr: &Node, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "AS OF"))
    }

    fn visit_returning(&self, _n: &ClauseNode, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "RETURNING"))
    }

    fn visit_on_conflict(
        &self,
        _n: &crate::ast::stmt::OnConflictNode,
        _r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "ON CONFLICT"))
    }

    fn visit_cascade(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "CASCADE"))
    }

    fn visit_restrict(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "RESTRICT"))
    }

    fn visit_for_update(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "FOR UPDATE"))
    }

    fn visit_for_share(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "FOR SHARE"))
    }

    fn visit_binary(&self, b: &BinaryNode, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
        if matches!(b.right, Rhs::List(_)) {
            return Err(QueryError::unsupported(
                self.name(),
                "arrays in this type of expression",
            ));
        }
        if b.op == "@@" {
            let left = self.visit(&b.left, r, ctx)?;
            let right = base::rhs_text(&b.right, r, ctx)?;
            return Ok(format!("(CONTAINS ({left}, {right}))"));
        }
        base::binary(b, r, ctx)
    }

    // T-SQL has no boolean literal in predicate position.
    fn case_when_value(&self, node: &Node, r: &mut Renderer) -> Result<String, QueryError> {
        if let Node::Parameter(Value::Bool(b)) = node {
            return Ok(if *b { "1=1" } else { "0=1" }.to_string());
        }
        base::visit(node, r, Clause::None)
    }

    fn visit_function_call(
        &self,
        f: &FunctionCallNode,
        r: &mut Renderer,
        ctx: Clause,
    ) -> Result<String, QueryError> {
        if base::is_count_table_star(f) {
            return Ok("COUNT(*)".to_string());
        }
        if base::is_bare_current_timestamp(f) {
            return Ok(f.name.to_uppercase());
        }
        let name = f.name.to_uppercase();
        match (name.as_str(), f.args.len()) {
            ("YEAR" | "MONTH" | "DAY" | "HOUR", 1) => {
                let column = self.visit(&f.args[0], r, ctx)?;
                Ok(format!("DATEPART({}, {column})", name.to_lowercase()))
            }
            ("LENGTH", _) => {
                let renamed = FunctionCallNode {
                    name: "LEN".to_string(),
                    args: f.args.clone(),
                };
                base::function_call(&renamed, r, ctx)
            }
            _ => base::function_call(f, r, ctx),
        }
    }
}
