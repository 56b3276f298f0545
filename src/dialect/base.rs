//! Base rendering rules shared by every dialect.
//!
//! These free functions are the default bodies of the [`Dialect`]
//! methods. They re-dispatch through `r.dialect`, so a dialect that
//! overrides one hook still sees its own overrides taken everywhere
//! below it.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::{
    ast::{
        expr::{BinaryNode, CaseNode, ColumnNode, FunctionCallNode, InNode, Rhs},
        stmt::{
            ClauseNode, ConflictTarget, CreateIndexNode, DropIndexNode, ForeignKeyNode, IndexType,
            IntervalNode, JoinKind, JoinNode, ModifierNode, OnConflictNode, QueryNode, TableRef,
        },
        Node,
    },
    dialect::{Hoist, ModifierKind, OrderByPage},
    error::QueryError,
    render::{Clause, Renderer},
    value::{hex_string, Value},
};

/// A single-quoted string literal with embedded quotes doubled.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub(crate) fn current_table(r: &Renderer) -> Result<TableRef, QueryError> {
    r.table
        .clone()
        .ok_or_else(|| QueryError::InvalidChild("statement clause outside a query".to_string()))
}

pub fn table_text(t: &TableRef, r: &Renderer) -> String {
    let d = r.dialect;
    let mut text = match &t.schema {
        Some(schema) => format!("{}.{}", d.quote(schema), d.quote(&t.name)),
        None => d.quote(&t.name),
    };
    if let Some(alias) = &t.alias {
        text.push_str(d.alias_sep());
        text.push_str(&d.quote(alias));
    }
    text
}

/// The expression dispatcher. Statement clauses are not expressions and
/// fail here.
pub fn visit(node: &Node, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
    let d = r.dialect;
    match node {
        Node::Query(q) | Node::Subquery(q) => subquery(q, r),
        Node::Binary(b) => d.visit_binary(b, r, ctx),
        Node::PrefixUnary(u) => {
            let operand = d.visit(&u.operand, r, ctx)?;
            Ok(format!("({} {})", u.op, operand))
        }
        Node::PostfixUnary(u) => {
            let operand = d.visit(&u.operand, r, ctx)?;
            Ok(format!("({} {})", operand, u.op))
        }
        Node::Ternary(t) => {
            let first = d.visit(&t.first, r, ctx)?;
            let second = d.visit(&t.second, r, ctx)?;
            let third = d.visit(&t.third, r, ctx)?;
            Ok(format!(
                "({} {} {} {} {})",
                first, t.op, second, t.separator, third
            ))
        }
        Node::In(n) => d.visit_in(n, false, r, ctx),
        Node::NotIn(n) => d.visit_in(n, true, r, ctx),
        Node::Case(c) => d.visit_case(c, r, ctx),
        Node::Cast(c) => {
            let expr = d.visit(&c.expr, r, ctx)?;
            Ok(format!("CAST({} AS {})", expr, c.data_type))
        }
        Node::At(a) => {
            let expr = d.visit(&a.expr, r, ctx)?;
            let index = d.visit(&a.index, r, ctx)?;
            Ok(format!("{expr}[{index}]"))
        }
        Node::Slice(s) => {
            let expr = d.visit(&s.expr, r, ctx)?;
            let start = d.visit(&s.start, r, ctx)?;
            let end = d.visit(&s.end, r, ctx)?;
            Ok(format!("{expr}[{start}:{end}]"))
        }
        Node::Column(c) => Ok(column(c, r, ctx)),
        Node::Table(t) => Ok(table_text(t, r)),
        Node::FunctionCall(f) => d.visit_function_call(f, r, ctx),
        Node::ArrayCall(n) | Node::RowCall(n) => {
            let items = visit_list(&n.children, r, ctx)?;
            Ok(format!("({})", items.join(", ")))
        }
        Node::Parameter(v) => d.visit_parameter(v, r),
        Node::Literal(s) | Node::Text(s) => Ok(s.clone()),
        Node::Alias(a) => {
            let expr = d.visit(&a.expr, r, ctx)?;
            Ok(format!("{}{}{}", expr, d.alias_sep(), d.quote(&a.alias)))
        }
        Node::OrderByValue(o) => {
            let mut text = d.visit(&o.expr, r, ctx)?;
            match o.direction {
                Some(crate::ast::stmt::OrderDir::Asc) => text.push_str(" ASC"),
                Some(crate::ast::stmt::OrderDir::Desc) => text.push_str(" DESC"),
                None => {}
            }
            Ok(text)
        }
        Node::Interval(i) => d.visit_interval(i),
        other => Err(QueryError::InvalidChild(format!(
            "{} nodes cannot be rendered in expression position",
            other.kind()
        ))),
    }
}

fn visit_list(nodes: &[Node], r: &mut Renderer, ctx: Clause) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    nodes.iter().map(|n| d.visit(n, r, ctx)).collect()
}

fn subquery(q: &QueryNode, r: &mut Renderer) -> Result<String, QueryError> {
    let d = r.dialect;
    let tokens = d.visit_query(q, r)?;
    let mut text = format!("({})", tokens.join(" "));
    if let Some(alias) = &q.alias {
        text.push(' ');
        text.push_str(&d.quote(alias));
    }
    Ok(text)
}

/// Column rendering is context sensitive: SELECT targets carry alias and
/// qualifier, INSERT column lists and SET/ALTER positions drop both.
pub fn column(c: &ColumnNode, r: &Renderer, ctx: Clause) -> String {
    let d = r.dialect;
    if c.is_star() {
        return match &c.table {
            Some(table) => format!("{}.*", d.quote(table)),
            None => "*".to_string(),
        };
    }
    match ctx {
        Clause::Insert | Clause::Update | Clause::Alter => d.quote(&c.name),
        _ => {
            let mut text = match &c.table {
                Some(table) => format!("{}.{}", d.quote(table), d.quote(&c.name)),
                None => d.quote(&c.name),
            };
            if ctx == Clause::Select {
                if let Some(alias) = &c.alias {
                    text.push_str(d.alias_sep());
                    text.push_str(&d.quote(alias));
                }
            }
            text
        }
    }
}

pub fn rhs_text(rhs: &Rhs, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
    let d = r.dialect;
    match rhs {
        Rhs::Node(node) => d.visit(node, r, ctx),
        Rhs::List(items) => {
            let items = visit_list(items, r, ctx)?;
            Ok(format!("({})", items.join(", ")))
        }
    }
}

pub fn binary(b: &BinaryNode, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
    let d = r.dialect;
    let left = d.visit(&b.left, r, ctx)?;
    let right = rhs_text(&b.right, r, ctx)?;
    Ok(format!("({} {} {})", left, b.op, right))
}

pub fn in_list(n: &InNode, negated: bool, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
    let d = r.dialect;
    let op = if negated { "NOT IN" } else { "IN" };
    match &n.right {
        // An empty list degenerates to a constant predicate instead of
        // emitting invalid `IN ()` syntax.
        Rhs::List(items) if items.is_empty() => {
            Ok(if negated { "(1 = 1)" } else { "(1 = 0)" }.to_string())
        }
        rhs => {
            let left = d.visit(&n.left, r, ctx)?;
            let right = rhs_text(rhs, r, ctx)?;
            Ok(format!("({left} {op} {right})"))
        }
    }
}

pub fn case(c: &CaseNode, r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
    let d = r.dialect;
    if c.whens.len() != c.thens.len() {
        return Err(QueryError::InvalidChild(
            "CASE requires matching WHEN and THEN lists".to_string(),
        ));
    }
    let mut text = String::from("(CASE");
    for (when, then) in c.whens.iter().zip(&c.thens) {
        let when = d.case_when_value(when, r)?;
        let then = d.visit(then, r, ctx)?;
        text.push_str(&format!(" WHEN {when} THEN {then}"));
    }
    if let Some(else_value) = &c.else_value {
        let else_value = d.visit(else_value, r, ctx)?;
        text.push_str(&format!(" ELSE {else_value}"));
    }
    text.push_str(" END)");
    Ok(text)
}

pub fn function_call(
    f: &FunctionCallNode,
    r: &mut Renderer,
    ctx: Clause,
) -> Result<String, QueryError> {
    let args = visit_list(&f.args, r, ctx)?;
    Ok(format!("{}({})", f.name, args.join(", ")))
}

/// True for a zero-argument `CURRENT_TIMESTAMP` call. MySQL, SQLite and
/// MSSQL treat it as a keyword and strip the parentheses.
pub fn is_bare_current_timestamp(f: &FunctionCallNode) -> bool {
    f.args.is_empty() && f.name.eq_ignore_ascii_case("CURRENT_TIMESTAMP")
}

/// True for `COUNT("t".*)`, which several dialects rewrite to
/// `COUNT(*)`.
pub fn is_count_table_star(f: &FunctionCallNode) -> bool {
    f.name.eq_ignore_ascii_case("COUNT")
        && f.args.len() == 1
        && matches!(&f.args[0], Node::Column(c) if c.is_star() && c.table.is_some())
}

pub fn interval(i: &IntervalNode) -> Result<String, QueryError> {
    let parts = [
        (i.years, "YEAR"),
        (i.months, "MONTH"),
        (i.days, "DAY"),
        (i.hours, "HOUR"),
        (i.minutes, "MINUTE"),
        (i.seconds, "SECOND"),
    ];
    let body: Vec<String> = parts
        .iter()
        .filter_map(|(v, unit)| v.map(|v| format!("{v} {unit}")))
        .collect();
    Ok(format!("INTERVAL {}", quote_string(&body.join(" "))))
}

pub fn as_of(keyword: &str, expr: &Node, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    Ok(vec![keyword.to_string(), d.visit(expr, r, Clause::None)?])
}

/// SET-style assignment lists: unparenthesized `"col" = value` pairs.
fn assignments(children: &[Node], r: &mut Renderer, ctx: Clause) -> Result<String, QueryError> {
    let d = r.dialect;
    let mut parts = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Node::Binary(b) => {
                let left = d.visit(&b.left, r, ctx)?;
                let right = rhs_text(&b.right, r, Clause::None)?;
                parts.push(format!("{} {} {}", left, b.op, right));
            }
            other => parts.push(d.visit(other, r, ctx)?),
        }
    }
    Ok(parts.join(", "))
}

pub fn query(q: &QueryNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    query_with(q, r, &Hoist::default())
}

/// The statement emission loop. Clauses are emitted in canonical order
/// regardless of the order builder calls pushed them. `hoist` carries
/// the pagination rewrite computed by a dialect's `visit_query`.
pub fn query_with(q: &QueryNode, r: &mut Renderer, hoist: &Hoist) -> Result<Vec<String>, QueryError> {
    let saved = r.table.replace(q.table.clone());
    let result = emit_query(q, r, hoist);
    r.table = saved;
    result
}

fn emit_query(q: &QueryNode, r: &mut Renderer, hoist: &Hoist) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let mut tokens: Vec<String> = Vec::new();

    let mut select = None;
    let mut insert = None;
    let mut replace = None;
    let mut update = None;
    let mut delete = None;
    let mut create = None;
    let mut create_view = None;
    let mut drop = None;
    let mut alter = None;
    let mut truncate = false;
    let mut indexes = false;
    let mut create_index = None;
    let mut drop_index = None;
    let mut from_targets: Vec<&Node> = Vec::new();
    let mut joins: Vec<&JoinNode> = Vec::new();
    let mut filters: Vec<&Node> = Vec::new();
    let mut group_by = None;
    let mut having = None;
    let mut order_by_clause = None;
    let mut limit = None;
    let mut offset = None;
    let mut returning = None;
    let mut on_conflict = None;
    let mut on_duplicate = None;
    let mut as_of_expr = None;
    let mut for_update = false;
    let mut for_share = false;

    for node in &q.nodes {
        match node {
            Node::Select(n) => select = Some(n),
            Node::Insert(n) => insert = Some(n),
            Node::Replace(n) => replace = Some(n),
            Node::Update(n) => update = Some(n),
            Node::Delete(n) => delete = Some(n),
            Node::Create(n) => create = Some(n),
            Node::CreateView(n) => create_view = Some(n),
            Node::Drop(n) => drop = Some(n),
            Node::Alter(n) => alter = Some(n),
            Node::Truncate => truncate = true,
            Node::Indexes => indexes = true,
            Node::CreateIndex(n) => create_index = Some(n),
            Node::DropIndex(n) => drop_index = Some(n),
            Node::From(n) => from_targets.extend(&n.children),
            Node::Join(n) => joins.push(n),
            Node::Where(n) => filters.extend(&n.children),
            Node::GroupBy(n) => group_by = Some(n),
            Node::Having(n) => having = Some(n),
            Node::OrderBy(n) => order_by_clause = Some(n),
            Node::Limit(n) => limit = Some(n),
            Node::Offset(n) => offset = Some(n),
            Node::Returning(n) => returning = Some(n),
            Node::OnConflict(n) => on_conflict = Some(n),
            Node::OnDuplicate(n) => on_duplicate = Some(n),
            Node::AsOf(expr) => as_of_expr = Some(expr.as_ref()),
            Node::ForUpdate => for_update = true,
            Node::ForShare => for_share = true,
            other => {
                return Err(QueryError::InvalidChild(format!(
                    "{} nodes cannot appear at statement level",
                    other.kind()
                )))
            }
        }
    }

    // Standalone DDL statements emit and return without query clauses.
    if let Some(n) = drop {
        return d.visit_drop(n, r);
    }
    if let Some(n) = alter {
        return d.visit_alter(n, r);
    }
    if truncate {
        return d.visit_truncate(r);
    }
    if indexes {
        return d.visit_indexes(r);
    }
    if let Some(n) = create_index {
        return d.visit_create_index(n, r);
    }
    if let Some(n) = drop_index {
        return d.visit_drop_index(n, r);
    }
    if let Some(n) = create {
        return d.visit_create(n, r);
    }

    let mut needs_from = false;
    if let Some(n) = insert {
        tokens.extend(d.visit_insert(n, r)?);
    } else if let Some(n) = replace {
        tokens.extend(d.visit_replace(n, r)?);
    } else if let Some(n) = update {
        tokens.extend(d.visit_update(n, r)?);
    } else if let Some(n) = delete {
        tokens.extend(d.visit_delete(n, r)?);
        needs_from = true;
    } else {
        if let Some(view) = create_view {
            tokens.push("CREATE VIEW".to_string());
            tokens.push(d.quote(&view.name));
            tokens.push("AS".to_string());
        }
        let implicit = ClauseNode::default();
        let clause = select.unwrap_or(&implicit);
        tokens.extend(d.visit_select(clause, hoist.top, r)?);
        needs_from = true;
    }

    if !from_targets.is_empty() {
        tokens.push("FROM".to_string());
        for (i, target) in from_targets.iter().enumerate() {
            if i > 0 {
                tokens.push(",".to_string());
            }
            tokens.push(d.visit(target, r, Clause::From)?);
        }
    } else if needs_from {
        let table = current_table(r)?;
        tokens.push("FROM".to_string());
        tokens.push(table_text(&table, r));
    }

    if let Some(expr) = as_of_expr {
        tokens.extend(d.visit_as_of(expr, r)?);
    }

    for j in joins {
        let keyword = match j.kind {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        };
        tokens.push(keyword.to_string());
        tokens.push(d.visit(&j.table, r, Clause::From)?);
        tokens.push("ON".to_string());
        tokens.push(d.visit(&j.on, r, Clause::None)?);
    }

    if !filters.is_empty() {
        tokens.push("WHERE".to_string());
        let conditions = visit_list(&filters.iter().map(|n| (*n).clone()).collect::<Vec<_>>(), r, Clause::None)?;
        tokens.push(conditions.join(" AND "));
    }

    if let Some(n) = group_by {
        if !n.children.is_empty() {
            tokens.push("GROUP BY".to_string());
            tokens.push(visit_list(&n.children, r, Clause::None)?.join(", "));
        }
    }

    if let Some(n) = having {
        if !n.children.is_empty() {
            tokens.push("HAVING".to_string());
            tokens.push(visit_list(&n.children, r, Clause::None)?.join(" AND "));
        }
    }

    if let Some(n) = order_by_clause {
        tokens.extend(d.visit_order_by(n, hoist.page, r)?);
    }

    if !hoist.active {
        if let Some(m) = limit {
            tokens.extend(d.visit_modifier(ModifierKind::Limit, m, r)?);
        }
        if let Some(m) = offset {
            tokens.extend(d.visit_modifier(ModifierKind::Offset, m, r)?);
        }
    }

    if let Some(n) = on_conflict {
        tokens.extend(d.visit_on_conflict(n, r)?);
    }
    if let Some(n) = on_duplicate {
        tokens.extend(d.visit_on_duplicate(n, r)?);
    }
    if let Some(n) = returning {
        tokens.extend(d.visit_returning(n, r)?);
    }
    if for_update {
        tokens.extend(d.visit_for_update()?);
    }
    if for_share {
        tokens.extend(d.visit_for_share()?);
    }

    Ok(tokens)
}

pub fn select(
    n: &ClauseNode,
    top: Option<&ModifierNode>,
    r: &mut Renderer,
) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let mut tokens = vec!["SELECT".to_string()];
    let mut columns = Vec::new();
    for child in &n.children {
        match child {
            Node::Distinct => tokens.push("DISTINCT".to_string()),
            Node::DistinctOn(on) => {
                let list = visit_list(&on.children, r, Clause::None)?;
                tokens.push(format!("DISTINCT ON({})", list.join(", ")));
            }
            other => columns.push(d.visit(other, r, Clause::Select)?),
        }
    }
    if let Some(m) = top {
        let count = d.visit(&m.count, r, Clause::None)?;
        tokens.push(format!("TOP({count})"));
    }
    if columns.is_empty() {
        tokens.push("*".to_string());
    } else {
        tokens.push(columns.join(", "));
    }
    Ok(tokens)
}

pub fn insert(n: &ClauseNode, keyword: &str, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let table = current_table(r)?;
    let mut tokens = vec![keyword.to_string()];

    let mut columns = Vec::new();
    let mut rows = Vec::new();
    for child in &n.children {
        match child {
            Node::OrIgnore => tokens.extend(d.visit_or_ignore()?),
            Node::RowCall(row) => rows.push(row),
            other => columns.push(d.visit(other, r, Clause::Insert)?),
        }
    }

    tokens.push("INTO".to_string());
    tokens.push(table_text(&table, r));

    if columns.is_empty() && rows.is_empty() {
        tokens.push("DEFAULT VALUES".to_string());
        return Ok(tokens);
    }

    if !columns.is_empty() {
        tokens.push(format!("({})", columns.join(", ")));
    }
    tokens.push("VALUES".to_string());
    let mut row_texts = Vec::with_capacity(rows.len());
    for row in rows {
        let items = visit_list(&row.children, r, Clause::None)?;
        row_texts.push(format!("({})", items.join(", ")));
    }
    tokens.push(row_texts.join(", "));
    Ok(tokens)
}

pub fn update(n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let table = current_table(r)?;
    Ok(vec![
        "UPDATE".to_string(),
        table_text(&table, r),
        "SET".to_string(),
        assignments(&n.children, r, Clause::Update)?,
    ])
}

pub fn delete(_n: &ClauseNode, _r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    Ok(vec!["DELETE".to_string()])
}

pub fn create(n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let table = current_table(r)?;
    let mut tokens = vec!["CREATE TABLE".to_string()];
    let mut definitions = Vec::new();
    for child in &n.children {
        match child {
            Node::IfNotExists => tokens.push("IF NOT EXISTS".to_string()),
            Node::ForeignKey(fk) => definitions.push(foreign_key(fk, r)),
            other => definitions.push(d.visit(other, r, Clause::Alter)?),
        }
    }
    tokens.push(table_text(&table, r));
    tokens.push(format!("({})", definitions.join(", ")));
    Ok(tokens)
}

pub fn foreign_key(fk: &ForeignKeyNode, r: &Renderer) -> String {
    let d = r.dialect;
    let mut text = String::new();
    if let Some(name) = &fk.name {
        text.push_str(&format!("CONSTRAINT {} ", d.quote(name)));
    }
    let columns: Vec<String> = fk.columns.iter().map(|c| d.quote(c)).collect();
    let ref_columns: Vec<String> = fk.ref_columns.iter().map(|c| d.quote(c)).collect();
    text.push_str(&format!(
        "FOREIGN KEY ({}) REFERENCES {} ({})",
        columns.join(", "),
        d.quote(&fk.ref_table),
        ref_columns.join(", ")
    ));
    if let Some(action) = &fk.on_delete {
        text.push_str(&format!(" ON DELETE {action}"));
    }
    if let Some(action) = &fk.on_update {
        text.push_str(&format!(" ON UPDATE {action}"));
    }
    text
}

pub fn drop_table(n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let table = current_table(r)?;
    let mut tokens = vec!["DROP TABLE".to_string()];
    let mut suffix = Vec::new();
    for child in &n.children {
        match child {
            Node::IfExists => tokens.push("IF EXISTS".to_string()),
            Node::Cascade => suffix.extend(d.visit_cascade()?),
            Node::Restrict => suffix.extend(d.visit_restrict()?),
            other => {
                return Err(QueryError::InvalidChild(format!(
                    "{} nodes cannot appear in a DROP clause",
                    other.kind()
                )))
            }
        }
    }
    tokens.push(table_text(&table, r));
    tokens.extend(suffix);
    Ok(tokens)
}

/// The ALTER TABLE operation held by the clause. Mixed operation kinds
/// in one statement are rejected.
pub enum AlterOp<'n> {
    AddColumn(Vec<&'n Node>),
    DropColumn(Vec<&'n Node>),
    Rename(Vec<&'n Node>),
    RenameColumn(Vec<&'n Node>),
}

pub fn alter_op<'n>(n: &'n ClauseNode, dialect: &'static str) -> Result<AlterOp<'n>, QueryError> {
    let mut op: Option<AlterOp<'n>> = None;
    for child in &n.children {
        match (child, &mut op) {
            (Node::AddColumn(inner), None) => op = Some(AlterOp::AddColumn(inner.children.iter().collect())),
            (Node::AddColumn(inner), Some(AlterOp::AddColumn(items))) => items.extend(&inner.children),
            (Node::DropColumn(inner), None) => op = Some(AlterOp::DropColumn(inner.children.iter().collect())),
            (Node::DropColumn(inner), Some(AlterOp::DropColumn(items))) => items.extend(&inner.children),
            (Node::Rename(inner), None) => op = Some(AlterOp::Rename(inner.children.iter().collect())),
            (Node::RenameColumn(inner), None) => op = Some(AlterOp::RenameColumn(inner.children.iter().collect())),
            _ => return Err(QueryError::unsupported(dialect, "mixed ALTER TABLE operations")),
        }
    }
    op.ok_or_else(|| QueryError::InvalidChild("ALTER requires at least one operation".to_string()))
}

pub fn alter(n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let table = current_table(r)?;
    let mut tokens = vec!["ALTER TABLE".to_string(), table_text(&table, r)];
    match alter_op(n, d.name())? {
        AlterOp::AddColumn(items) => {
            let defs = alter_items(&items, r)?;
            let parts: Vec<String> = defs.into_iter().map(|def| format!("ADD COLUMN {def}")).collect();
            tokens.push(parts.join(", "));
        }
        AlterOp::DropColumn(items) => {
            let names = alter_items(&items, r)?;
            let parts: Vec<String> = names.into_iter().map(|name| format!("DROP COLUMN {name}")).collect();
            tokens.push(parts.join(", "));
        }
        AlterOp::Rename(items) => {
            let names = alter_items(&items, r)?;
            match names.as_slice() {
                [new_name] => tokens.push(format!("RENAME TO {new_name}")),
                _ => {
                    return Err(QueryError::InvalidChild(
                        "RENAME takes exactly one new name".to_string(),
                    ))
                }
            }
        }
        AlterOp::RenameColumn(items) => {
            let names = alter_items(&items, r)?;
            match names.as_slice() {
                [old, new] => tokens.push(format!("RENAME COLUMN {old} TO {new}")),
                _ => {
                    return Err(QueryError::InvalidChild(
                        "RENAME COLUMN takes an old and a new name".to_string(),
                    ))
                }
            }
        }
    }
    Ok(tokens)
}

pub fn alter_items(items: &[&Node], r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    items.iter().map(|n| d.visit(n, r, Clause::Alter)).collect()
}

pub fn truncate(r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let table = current_table(r)?;
    Ok(vec!["TRUNCATE TABLE".to_string(), table_text(&table, r)])
}

/// Column names in their raw (unquoted) form, used for default index
/// names.
fn raw_names(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .map(|n| match n {
            Node::Column(c) => c.name.clone(),
            Node::Text(s) | Node::Literal(s) => s.clone(),
            other => other.kind().to_lowercase(),
        })
        .collect()
}

pub fn create_index(n: &CreateIndexNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let table = current_table(r)?;
    let mut tokens = vec!["CREATE".to_string()];
    match n.index_type {
        Some(IndexType::Unique) => tokens.push("UNIQUE".to_string()),
        Some(IndexType::Fulltext) => tokens.push("FULLTEXT".to_string()),
        Some(IndexType::Spatial) => tokens.push("SPATIAL".to_string()),
        None => {}
    }
    tokens.push("INDEX".to_string());
    if n.if_not_exists {
        tokens.extend(d.visit_if_not_exists_index()?);
    }
    tokens.push(d.quote(&index_name(n, &table)));
    tokens.push("ON".to_string());
    tokens.push(table_text(&table, r));
    let columns = visit_list(&n.columns, r, Clause::Alter)?;
    tokens.push(format!("({})", columns.join(", ")));
    if let Some(algorithm) = &n.algorithm {
        tokens.push("USING".to_string());
        tokens.push(algorithm.clone());
    }
    Ok(tokens)
}

/// The default index name is the table name joined with the sorted
/// column names, so the same column set always maps to the same name.
pub fn index_name(n: &CreateIndexNode, table: &TableRef) -> String {
    match &n.name {
        Some(name) => name.clone(),
        None => {
            let mut names = raw_names(&n.columns);
            names.sort();
            format!("{}_{}", table.name, names.join("_"))
        }
    }
}

pub fn drop_index(n: &DropIndexNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let mut tokens = vec!["DROP INDEX".to_string()];
    if n.if_exists {
        tokens.extend(d.visit_if_exists_index()?);
    }
    // Indexes live in the table's schema, so the qualifier carries over.
    match r.table.as_ref().and_then(|t| t.schema.as_deref()) {
        Some(schema) => tokens.push(format!("{}.{}", d.quote(schema), d.quote(&n.name))),
        None => tokens.push(d.quote(&n.name)),
    }
    Ok(tokens)
}

pub fn order_by(
    n: &ClauseNode,
    page: Option<OrderByPage<'_>>,
    r: &mut Renderer,
) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let mut tokens = vec!["ORDER BY".to_string()];
    let items = visit_list(&n.children, r, Clause::None)?;
    tokens.push(items.join(", "));
    if let Some(suffix) = d.null_order_suffix() {
        tokens.push(suffix.to_string());
    }
    if let Some(page) = page {
        tokens.push("OFFSET".to_string());
        tokens.push(d.visit(&page.offset.count, r, Clause::None)?);
        tokens.push("ROWS".to_string());
        if let Some(fetch) = page.fetch {
            tokens.push("FETCH NEXT".to_string());
            tokens.push(d.visit(&fetch.count, r, Clause::None)?);
            tokens.push("ROWS ONLY".to_string());
        }
    }
    Ok(tokens)
}

pub fn modifier(
    kind: ModifierKind,
    m: &ModifierNode,
    r: &mut Renderer,
) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let keyword = match kind {
        ModifierKind::Limit => "LIMIT",
        ModifierKind::Offset => "OFFSET",
    };
    Ok(vec![keyword.to_string(), d.visit(&m.count, r, Clause::None)?])
}

pub fn returning(n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let items = visit_list(&n.children, r, Clause::Select)?;
    Ok(vec!["RETURNING".to_string(), items.join(", ")])
}

pub fn on_conflict(n: &OnConflictNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    let d = r.dialect;
    let mut tokens = vec!["ON CONFLICT".to_string()];
    match &n.target {
        Some(ConflictTarget::Columns(columns)) => {
            let quoted: Vec<String> = columns.iter().map(|c| d.quote(c)).collect();
            tokens.push(format!("({})", quoted.join(", ")));
        }
        Some(ConflictTarget::Constraint(name)) => {
            tokens.push("ON CONSTRAINT".to_string());
            tokens.push(d.quote(name));
        }
        None => {}
    }
    match &n.update_columns {
        None => tokens.push("DO NOTHING".to_string()),
        Some(columns) => {
            tokens.push("DO UPDATE SET".to_string());
            let sets: Vec<String> = columns
                .iter()
                .map(|c| format!("{q} = EXCLUDED.{q}", q = d.quote(c)))
                .collect();
            tokens.push(sets.join(", "));
        }
    }
    Ok(tokens)
}

pub fn on_duplicate(n: &ClauseNode, r: &mut Renderer) -> Result<Vec<String>, QueryError> {
    Ok(vec![
        "ON DUPLICATE KEY UPDATE".to_string(),
        assignments(&n.children, r, Clause::Update)?,
    ])
}

/// A timestamp in ISO form with millisecond precision. Years before 1 CE
/// render in era form with a BC suffix.
pub fn timestamp_string(ts: &DateTime<Utc>) -> String {
    let year = ts.year();
    let (era_year, bc) = if year < 1 { (1 - year, true) } else { (year, false) };
    let mut text = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        era_year,
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.timestamp_subsec_millis()
    );
    if bc {
        text.push_str(" BC");
    }
    text
}

fn array_element(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Bytes(b) => format!("\"\\\\x{}\"", hex_string(b)),
        Value::Date(d) => d.to_string(),
        Value::Timestamp(ts) => timestamp_string(ts),
        Value::Uuid(u) => u.to_string(),
        Value::Json(j) => j.to_string(),
        Value::Array(items) => array_body(items),
        Value::Row(_) => v.to_json().to_string(),
    }
}

fn array_body(items: &[Value]) -> String {
    let elements: Vec<String> = items.iter().map(array_element).collect();
    format!("{{{}}}", elements.join(","))
}

/// The base inline literal encoding, Postgres-flavoured.
pub fn encode_value(v: &Value) -> Result<String, QueryError> {
    Ok(match v {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => quote_string(s),
        Value::Bytes(b) => format!("'\\x{}'", hex_string(b)),
        Value::Date(d) => quote_string(&d.to_string()),
        Value::Timestamp(ts) => quote_string(&timestamp_string(ts)),
        Value::Uuid(u) => quote_string(&u.to_string()),
        Value::Json(j) => quote_string(&j.to_string()),
        // Arrays of row objects inline as a JSON document; everything
        // else uses the brace array literal form.
        Value::Array(items) => {
            if items.iter().any(|i| matches!(i, Value::Row(_) | Value::Json(_))) {
                quote_string(&v.to_json().to_string())
            } else {
                quote_string(&array_body(items))
            }
        }
        Value::Row(_) => quote_string(&v.to_json().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{ops::Expression, stmt::QueryNode},
        render::{render, render_inline},
    };
    use chrono::TimeZone;

    fn orders() -> QueryNode {
        QueryNode::new(TableRef::new("orders"))
    }

    #[test]
    fn test_join_with_condition() {
        let o = orders();
        let query = Node::Query(
            orders()
                .select(vec![o.column("id"), Node::Column(ColumnNode::qualified("customers", "name"))])
                .join(
                    JoinKind::Left,
                    TableRef::new("customers"),
                    o.column("customer_id")
                        .equals(Node::Column(ColumnNode::qualified("customers", "id"))),
                ),
        );
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"SELECT "orders"."id", "customers"."name" FROM "orders" LEFT JOIN "customers" ON ("orders"."customer_id" = "customers"."id")"#
        );
    }

    #[test]
    fn test_group_by_having() {
        let o = orders();
        let query = Node::Query(
            orders()
                .select(vec![
                    o.column("status"),
                    Node::FunctionCall(FunctionCallNode {
                        name: "COUNT".to_string(),
                        args: vec![Node::Column(ColumnNode::new("*"))],
                    })
                    .alias("n"),
                ])
                .group_by(vec![o.column("status")])
                .having(
                    Node::FunctionCall(FunctionCallNode {
                        name: "COUNT".to_string(),
                        args: vec![Node::Column(ColumnNode::new("*"))],
                    })
                    .gt(5),
                ),
        );
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"SELECT "orders"."status", COUNT(*) AS "n" FROM "orders" GROUP BY "orders"."status" HAVING (COUNT(*) > $1)"#
        );
    }

    #[test]
    fn test_insert_rows_and_default_values() {
        let query = Node::Query(orders().insert(
            vec![Node::Column(ColumnNode::new("status")), Node::Column(ColumnNode::new("total"))],
            vec![
                vec![Value::from("open").into(), Value::from(10).into()],
                vec![Value::from("closed").into(), Value::from(20).into()],
            ],
        ));
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"INSERT INTO "orders" ("status", "total") VALUES ($1, $2), ($3, $4)"#
        );
        assert_eq!(rendered.values.len(), 4);

        let empty = Node::Query(orders().insert(vec![], vec![]));
        let rendered = render(&empty, None).unwrap();
        assert_eq!(rendered.text, r#"INSERT INTO "orders" DEFAULT VALUES"#);
    }

    #[test]
    fn test_update_assignments_are_unqualified() {
        let o = orders();
        let query = Node::Query(
            orders()
                .update(vec![(Node::Column(ColumnNode::new("status")), Value::from("done").into())])
                .filter(o.column("id").equals(7)),
        );
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"UPDATE "orders" SET "status" = $1 WHERE ("orders"."id" = $2)"#
        );
    }

    #[test]
    fn test_delete_gets_implicit_from() {
        let o = orders();
        let query = Node::Query(orders().delete().filter(o.column("id").equals(1)));
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"DELETE FROM "orders" WHERE ("orders"."id" = $1)"#
        );
    }

    #[test]
    fn test_create_table_with_foreign_key() {
        let query = Node::Query(
            orders()
                .create(vec![
                    Node::from("\"id\" BIGINT PRIMARY KEY"),
                    Node::from("\"customer_id\" BIGINT"),
                    Node::ForeignKey(ForeignKeyNode {
                        name: Some("fk_customer".to_string()),
                        columns: vec!["customer_id".to_string()],
                        ref_table: "customers".to_string(),
                        ref_columns: vec!["id".to_string()],
                        on_delete: Some("CASCADE".to_string()),
                        on_update: None,
                    }),
                ])
                .if_not_exists(),
        );
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"CREATE TABLE IF NOT EXISTS "orders" ("id" BIGINT PRIMARY KEY, "customer_id" BIGINT, CONSTRAINT "fk_customer" FOREIGN KEY ("customer_id") REFERENCES "customers" ("id") ON DELETE CASCADE)"#
        );
    }

    #[test]
    fn test_drop_cascade() {
        let query = Node::Query(orders().drop().if_exists().cascade());
        let rendered = render(&query, None).unwrap();
        assert_eq!(rendered.text, r#"DROP TABLE IF EXISTS "orders" CASCADE"#);
    }

    #[test]
    fn test_truncate_renders_table_keyword() {
        let query = Node::Query(orders().truncate());
        let rendered = render(&query, None).unwrap();
        assert_eq!(rendered.text, r#"TRUNCATE TABLE "orders""#);
    }

    #[test]
    fn test_current_timestamp_keeps_parens() {
        let query = Node::Query(orders().select(vec![Node::FunctionCall(FunctionCallNode {
            name: "CURRENT_TIMESTAMP".to_string(),
            args: vec![],
        })]));
        let rendered = render(&query, None).unwrap();
        assert_eq!(rendered.text, r#"SELECT CURRENT_TIMESTAMP() FROM "orders""#);
    }

    #[test]
    fn test_drop_index_carries_table_schema() {
        let query = Node::Query(
            QueryNode::new(TableRef::with_schema("app", "orders")).drop_index(DropIndexNode {
                name: "orders_total".to_string(),
                if_exists: true,
            }),
        );
        let rendered = render(&query, None).unwrap();
        assert_eq!(rendered.text, r#"DROP INDEX IF EXISTS "app"."orders_total""#);

        let query = Node::Query(orders().drop_index(DropIndexNode {
            name: "orders_total".to_string(),
            if_exists: false,
        }));
        let rendered = render(&query, None).unwrap();
        assert_eq!(rendered.text, r#"DROP INDEX "orders_total""#);
    }

    #[test]
    fn test_empty_in_list_degenerates() {
        let o = orders();
        let empty: Vec<i64> = vec![];
        let query = Node::Query(orders().select(vec![o.column("id")]).filter(o.column("id").in_(empty)));
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"SELECT "orders"."id" FROM "orders" WHERE (1 = 0)"#
        );

        let empty: Vec<i64> = vec![];
        let query = Node::Query(orders().select(vec![o.column("id")]).filter(o.column("id").not_in(empty)));
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"SELECT "orders"."id" FROM "orders" WHERE (1 = 1)"#
        );
    }

    #[test]
    fn test_subquery_with_alias() {
        let o = orders();
        let inner = orders()
            .select(vec![o.column("customer_id")])
            .filter(o.column("total").gt(100))
            .alias("big");
        let query = Node::Query(QueryNode::new(TableRef::new("customers")).from(inner.into_subquery()));
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"SELECT * FROM (SELECT "orders"."customer_id" FROM "orders" WHERE ("orders"."total" > $1)) "big""#
        );
    }

    #[test]
    fn test_case_expression() {
        let o = orders();
        let expr = crate::ast::ops::case(
            vec![o.column("total").gt(100)],
            vec![Node::from(Value::from("big"))],
            Some(Node::from(Value::from("small"))),
        )
        .unwrap();
        let query = Node::Query(orders().select(vec![expr]));
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"SELECT (CASE WHEN ("orders"."total" > $1) THEN $2 ELSE $3 END) FROM "orders""#
        );
    }

    #[test]
    fn test_create_index_default_name_sorts_columns() {
        let query = Node::Query(orders().create_index(CreateIndexNode {
            name: None,
            columns: vec![
                Node::Column(ColumnNode::new("b_col")),
                Node::Column(ColumnNode::new("a_col")),
            ],
            index_type: None,
            algorithm: None,
            if_not_exists: false,
        }));
        let rendered = render(&query, None).unwrap();
        assert_eq!(
            rendered.text,
            r#"CREATE INDEX "orders_a_col_b_col" ON "orders" ("b_col", "a_col")"#
        );
    }

    #[test]
    fn test_alter_rejects_mixed_operations() {
        let query = Node::Query(orders().alter(vec![
            Node::AddColumn(ClauseNode::with(vec![Node::from("a TEXT")])),
            Node::DropColumn(ClauseNode::with(vec![Node::Column(ColumnNode::new("b"))])),
        ]));
        let err = render(&query, None).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedConstruct { .. }));
    }

    #[test]
    fn test_inline_timestamp_bc_era() {
        let ts = Utc.with_ymd_and_hms(-44, 3, 15, 12, 0, 0).unwrap();
        let o = orders();
        let query = Node::Query(orders().select(vec![o.column("id")]).filter(o.column("at").equals(Value::Timestamp(ts))));
        let sql = render_inline(&query, None).unwrap();
        assert!(sql.as_str().contains("'0045-03-15T12:00:00.000Z BC'"), "{sql}");
    }

    #[test]
    fn test_inline_array_literal() {
        let tags = Value::Array(vec![Value::from("a"), Value::from("b c")]);
        let o = orders();
        let query = Node::Query(orders().select(vec![o.column("id")]).filter(o.column("tags").equals(tags)));
        let sql = render_inline(&query, None).unwrap();
        assert!(sql.as_str().contains(r#"'{"a","b c"}'"#), "{sql}");
    }
}
