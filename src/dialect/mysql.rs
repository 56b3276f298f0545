//! MySQL. Backtick quoting, positionless `?` placeholders, native
//! REPLACE and ON DUPLICATE KEY UPDATE, CHANGE COLUMN renames.

use crate::{
    ast::{
        expr::{BinaryNode, FunctionCallNode},
        stmt::{ClauseNode, DropIndexNode, IntervalNode},
        Node,
    },
    dialect::{base, base::AlterOp, Dialect},
    error::QueryError,
    render::{Clause, Renderer},
    value::{hex_string, Value},
};

#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn quote(&self, ident: &str) -> String {
        format!("`{ident}`")
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn visit_insert(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        let mut tokens = base::insert(n, "INSERT", r)?;
        // MySQL has no DEFAULT VALUES form.
        for token in &mut tokens {
            if token == "DEFAULT VALUES" {
                *token = "() VALUES ()".to_string();
            }
        }
        Ok(tokens)
    }

    fn visit_replace(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::insert(n, "REPLACE", r)
    }

    fn visit_on_duplicate(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::on_duplicate(n, r)
    }

    fn visit_on_conflict(
        &self,
        _n: &crate::ast::stmt::OnConflictNode,
        _r: &mut Renderer,
    ) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "ON CONFLICT"))
    }

    fn visit_returning(&self, _n: &ClauseNode, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "RETURNING"))
    }

    fn visit_as_of(&self, _expr: &Node, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "AS OF"))
    }

    fn visit_for_share(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "FOR SHARE"))
    }

    fn visit_if_not_exists_index(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "IF NOT EXISTS on indexes"))
    }

    fn visit_if_exists_index(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "IF EXISTS on indexes"))
    }

    fn visit_indexes(&self, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        let table = base::current_table(r)?;
        Ok(vec![
            "SHOW INDEX FROM".to_string(),
            base::table_text(&table, r),
        ])
    }

    // DROP INDEX needs the table spelled out.
    fn visit_drop_index(&self, n: &DropIndexNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
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

    /// Column renames use CHANGE COLUMN, which redeclares the column and
    /// therefore needs the data type spelled out.
    fn visit_alter(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        match base::alter_op(n, self.name())? {
            AlterOp::RenameColumn(items) => {
                let table = base::current_table(r)?;
                let old_name = match items.first() {
                    Some(Node::Column(c)) => c.name.clone(),
                    Some(Node::Text(s)) | Some(Node::Literal(s)) => s.clone(),
                    _ => String::new(),
                };
                let parts = base::alter_items(&items, r)?;
                match parts.as_slice() {
                    [old, new, data_type] => Ok(vec![
                        "ALTER TABLE".to_string(),
                        base::table_text(&table, r),
                        format!("CHANGE COLUMN {old} {new} {data_type}"),
                    ]),
                    [_, _] => Err(QueryError::MissingDataType(old_name)),
                    _ => Err(QueryError::InvalidChild(
                        "CHANGE COLUMN takes an old name, a new name and a data type".to_string(),
                    )),
                }
            }
            _ => base::alter(n, r),
        }
    }

    fn visit_binary(&self, b: &BinaryNode, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
        if b.op == "@@" {
            let left = self.visit(&b.left, r, ctx)?;
            let right = base::rhs_text(&b.right, r, ctx)?;
            return Ok(format!("(MATCH {left} AGAINST {right})"));
        }
        base::binary(b, r, ctx)
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
        base::function_call(f, r, ctx)
    }

    /// MySQL interval literals pick a composite unit from the populated
    /// fields: YEAR_MONTH, DAY_SECOND or HOUR_SECOND.
    fn visit_interval(&self, i: &IntervalNode) -> Result<String, QueryError> {
        match (i.years, i.months) {
            (Some(years), Some(months)) => {
                return Ok(format!("INTERVAL '{years}-{months}' YEAR_MONTH"));
            }
            (Some(years), None) => return Ok(format!("INTERVAL {years} YEAR")),
            (None, Some(months)) => return Ok(format!("INTERVAL {months} MONTH")),
            (None, None) => {}
        }
        let hours = i.hours.unwrap_or(0);
        let minutes = i.minutes.unwrap_or(0);
        let seconds = i.seconds.unwrap_or(0);
        match i.days {
            Some(days) => Ok(format!("INTERVAL '{days} {hours}:{minutes}:{seconds}' DAY_SECOND")),
            None => Ok(format!("INTERVAL '{hours}:{minutes}:{seconds}' HOUR_SECOND")),
        }
    }

    fn encode_value(&self, v: &Value) -> Result<String, QueryError> {
        match v {
            Value::Bytes(b) => Ok(format!("x'{}'", hex_string(b))),
            other => base::encode_value(other),
        }
    }
}
