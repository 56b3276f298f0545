//! SQLite. Double-quote identifiers with `$n` placeholders, TRUNCATE as
//! DELETE FROM, one ADD COLUMN per statement, optional epoch-millisecond
//! date encoding.

use crate::{
    ast::{
        expr::{BinaryNode, FunctionCallNode},
        stmt::ClauseNode,
        Node,
    },
    dialect::{base, base::AlterOp, Dialect},
    error::QueryError,
    render::{Clause, Renderer},
    value::{hex_string, Value},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Sqlite {
    /// Encode dates and timestamps as epoch milliseconds instead of ISO
    /// strings, and unwrap them with `datetime(.., "unixepoch")` in the
    /// date part functions.
    pub date_time_millis: bool,
}

impl Sqlite {
    fn date_column(&self, column: String) -> String {
        if self.date_time_millis {
            format!("datetime({column}/1000, \"unixepoch\")")
        } else {
            column
        }
    }
}

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn visit_replace(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        base::insert(n, "REPLACE", r)
    }

    fn visit_or_ignore(&self) -> Result<Vec<String>, QueryError> {
        Ok(vec!["OR IGNORE".to_string()])
    }

    fn visit_truncate(&self, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        let table = base::current_table(r)?;
        Ok(vec!["DELETE FROM".to_string(), base::table_text(&table, r)])
    }

    fn visit_indexes(&self, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        let table = base::current_table(r)?;
        Ok(vec![format!("PRAGMA INDEX_LIST({})", base::table_text(&table, r))])
    }

    fn visit_alter(&self, n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        match base::alter_op(n, self.name())? {
            AlterOp::AddColumn(items) if items.len() > 1 => Err(QueryError::unsupported(
                self.name(),
                "adding multiple columns in one statement",
            )),
            AlterOp::AddColumn(_) => base::alter(n, r),
            AlterOp::DropColumn(_) => Err(QueryError::unsupported(self.name(), "DROP COLUMN")),
            AlterOp::Rename(_) => Err(QueryError::unsupported(self.name(), "RENAME")),
            AlterOp::RenameColumn(_) => {
                Err(QueryError::unsupported(self.name(), "RENAME COLUMN"))
            }
        }
    }

    fn visit_as_of(&self, _expr: &Node, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "AS OF"))
    }

    fn visit_returning(&self, _n: &ClauseNode, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "RETURNING"))
    }

    fn visit_for_update(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "FOR UPDATE"))
    }

    fn visit_for_share(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "FOR SHARE"))
    }

    fn visit_cascade(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "CASCADE"))
    }

    fn visit_restrict(&self) -> Result<Vec<String>, QueryError> {
        Err(QueryError::unsupported(self.name(), "RESTRICT"))
    }

    fn visit_binary(&self, b: &BinaryNode, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
        if b.op == "@@" {
            let swapped = BinaryNode {
                left: b.left.clone(),
                op: "MATCH".to_string(),
                right: b.right.clone(),
            };
            return base::binary(&swapped, r, ctx);
        }
        base::binary(b, r, ctx)
    }

    fn visit_function_call(
        &self,
        f: &FunctionCallNode,
        r: &mut Renderer,
        ctx: Clause,
    ) -> Result<String, QueryError> {
        if base::is_bare_current_timestamp(f) {
            return Ok(f.name.to_uppercase());
        }
        let date_part = |fmt: &str| -> Option<String> {
            if f.args.len() == 1 {
                Some(fmt.to_string())
            } else {
                None
            }
        };
        let strftime_fmt = match f.name.to_uppercase().as_str() {
            "YEAR" => date_part("%Y"),
            "MONTH" => date_part("%m"),
            "DAY" => date_part("%d"),
            "HOUR" => date_part("%H"),
            _ => None,
        };
        if let Some(fmt) = strftime_fmt {
            let column = self.visit(&f.args[0], r, ctx)?;
            return Ok(format!("strftime('{fmt}', {})", self.date_column(column)));
        }

        match (f.name.to_uppercase().as_str(), f.args.len()) {
            // SUBSTR stands in for the LEFT/RIGHT pair.
            ("LEFT", 2) => {
                let column = self.visit(&f.args[0], r, ctx)?;
                let count = self.visit(&f.args[1], r, ctx)?;
                Ok(format!("SUBSTR({column}, 1, {count})"))
            }
            ("RIGHT", 2) => {
                let column = self.visit(&f.args[0], r, ctx)?;
                let count = self.visit(&f.args[1], r, ctx)?;
                Ok(format!("SUBSTR({column}, -{count})"))
            }
            _ => base::function_call(f, r, ctx),
        }
    }

    fn encode_value(&self, v: &Value) -> Result<String, QueryError> {
        match v {
            Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            Value::Bytes(b) => Ok(format!("x'{}'", hex_string(b))),
            Value::Timestamp(ts) if self.date_time_millis => Ok(ts.timestamp_millis().to_string()),
            Value::Date(d) if self.date_time_millis => {
                let millis = d
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| dt.and_utc().timestamp_millis())
                    .unwrap_or_default();
                Ok(millis.to_string())
            }
            Value::Array(_) | Value::Row(_) => Ok(base::quote_string(&v.to_json().to_string())),
            other => base::encode_value(other),
        }
    }
}
