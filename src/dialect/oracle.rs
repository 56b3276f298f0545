//! Oracle. `:n` placeholders, bare-space aliases, OFFSET/FETCH
//! pagination with clause reordering, PL/SQL existence guards keyed on
//! ORA error codes.

use tracing::trace;

use crate::{
    ast::{
        expr::{BinaryNode, FunctionCallNode, Rhs},
        stmt::{ClauseNode, QueryNode},
        Node,
    },
    dialect::{base, base::AlterOp, Dialect, ModifierKind},
    error::QueryError,
    render::{Clause, Renderer},
    value::{hex_string, Value},
};

#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl Dialect for Oracle {
    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":{index}")
    }

    fn alias_sep(&self) -> &'static str {
        " "
    }

    /// Emits through the base loop, then reorders the OFFSET and FETCH
    /// NEXT spans: the builder allows limit before offset but Oracle
    /// requires OFFSET first.
    fn visit_query(&self, q: &QueryNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        let mut tokens = base::query(q, r)?;
        let offset_idx = tokens.iter().position(|t| t == "OFFSET");
        let fetch_idx = tokens.iter().position(|t| t == "FETCH NEXT");
        if let (Some(offset), Some(fetch)) = (offset_idx, fetch_idx) {
            if offset > fetch {
                trace!("moving the OFFSET span ahead of FETCH NEXT");
                let span: Vec<String> = tokens.drain(offset..offset + 3).collect();
                tokens.splice(fetch..fetch, span);
            }
        }
        Ok(tokens)
    }

    fn visit_modifier(
        &self,
        kind: ModifierKind,
        m: &crate::ast::stmt::ModifierNode,
        r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        let count = self.visit(&m.count, r, Clause::None)?;
        Ok(match kind {
            ModifierKind::Offset => vec!["OFFSET".to_string(), count, "ROWS".to_string()],
            ModifierKind::Limit => vec!["FETCH NEXT".to_string(), count, "ROWS ONLY".to_string()],
        })
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
        let create = base::create(&inner, r)?.join(" ").replace('\'', "''");
        Ok(vec![format!(
            "BEGIN EXECUTE IMMEDIATE '{create}'; EXCEPTION WHEN OTHERS THEN IF SQLCODE != -955 THEN RAISE; END IF; END;"
        )])
    }

    fn visit_drop(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        if !n.children.iter().any(|c| matches!(c, Node::IfExists)) {
            return base::drop_table(n, r);
        }
        let table = base::current_table(r)?;
        let table = base::table_text(&table, r);
        Ok(vec![format!(
            "BEGIN EXECUTE IMMEDIATE 'DROP TABLE {table}'; EXCEPTION WHEN OTHERS THEN IF SQLCODE != -942 THEN RAISE; END IF; END;"
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
                    format!("ADD ({})", defs.join(", ")),
                ])
            }
            AlterOp::DropColumn(items) => {
                let names = base::alter_items(&items, r)?;
                Ok(vec![
                    "ALTER TABLE".to_string(),
                    table,
                    format!("DROP ({})", names.join(", ")),
                ])
            }
            AlterOp::Rename(_) => Err(QueryError::unsupported(self.name(), "RENAME")),
            AlterOp::RenameColumn(_) => {
                Err(QueryError::unsupported(self.name(), "RENAME COLUMN"))
            }
        }
    }

    fn visit_indexes(&self, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        let table = base::current_table(r)?;
        let mut text = format!(
            "SELECT * FROM USER_INDEXES WHERE TABLE_NAME = '{}'",
            table.name
        );
        if let Some(schema) = &table.schema {
            text.push_str(&format!(" AND TABLE_OWNER = '{schema}'"));
        }
        Ok(vec![text])
    }

    fn visit_as_of(&self, expr: &Node, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::as_of("AS OF TIMESTAMP", expr, r)
    }

    fn visit_cascade(&self) -> Result<Vec<String>, QueryError> {
        Ok(vec!["CASCADE CONSTRAINTS".to_string()])
    }

    fn visit_restrict(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "RESTRICT"))
    }

    fn visit_for_share(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "FOR SHARE"))
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

    fn visit_if_not_exists_index(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "IF NOT EXISTS on indexes"))
    }

    fn visit_if_exists_index(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "IF EXISTS on indexes"))
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
            return Ok(format!("(INSTR ({left}, {right}) > 0)"));
        }
        base::binary(b, r, ctx)
    }

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
        base::function_call(f, r, ctx)
    }

    fn encode_value(&self, v: &Value) -> Result<String, QueryError> {
        match v {
            Value::Bytes(b) => Ok(format!(
                "utl_raw.cast_to_varchar2(hextoraw('{}'))",
                hex_string(b)
            )),
            other => base::encode_value(other),
        }
    }
}
