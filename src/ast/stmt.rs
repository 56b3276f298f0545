//! Statement and clause node payloads.

use crate::ast::{
    expr::{BinaryNode, ColumnNode, Rhs},
    Node,
};
use crate::ast::ops::Operand;

/// A schema-qualified table reference with an optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        TableRef {
            schema: None,
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn with_schema(schema: &str, name: &str) -> Self {
        TableRef {
            schema: Some(schema.to_string()),
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }
}

/// Generic ordered child list used by clause-like kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseNode {
    pub children: Vec<Node>,
}

impl ClauseNode {
    pub fn with(children: Vec<Node>) -> Self {
        ClauseNode { children }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    pub kind: JoinKind,
    pub table: Box<Node>,
    pub on: Box<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByValueNode {
    pub expr: Box<Node>,
    pub direction: Option<OrderDir>,
}

/// LIMIT/OFFSET payload. The count is itself a node, usually a
/// PARAMETER, so it participates in placeholder numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierNode {
    pub count: Box<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    Unique,
    Fulltext,
    Spatial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexNode {
    pub name: Option<String>,
    pub columns: Vec<Node>,
    pub index_type: Option<IndexType>,
    pub algorithm: Option<String>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexNode {
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyNode {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictTarget {
    Columns(Vec<String>),
    Constraint(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnConflictNode {
    pub target: Option<ConflictTarget>,
    /// `None` renders DO NOTHING; columns render DO UPDATE SET from
    /// the EXCLUDED pseudo-table.
    pub update_columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalNode {
    pub years: Option<i64>,
    pub months: Option<i64>,
    pub days: Option<i64>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
}

/// The root of a statement tree. Children are top-level clause nodes in
/// insertion order; the builder methods below are thin conveniences
/// that push the corresponding clause node.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryNode {
    pub table: TableRef,
    pub nodes: Vec<Node>,
    pub alias: Option<String>,
}

impl QueryNode {
    pub fn new(table: TableRef) -> Self {
        QueryNode {
            table,
            nodes: Vec::new(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn select(mut self, columns: Vec<Node>) -> Self {
        self.nodes.push(Node::Select(ClauseNode::with(columns)));
        self
    }

    /// Marks the SELECT clause DISTINCT. A missing SELECT clause gets an
    /// empty one so the marker has somewhere to live.
    pub fn distinct(mut self) -> Self {
        match self.select_clause() {
            Some(sel) => sel.children.insert(0, Node::Distinct),
            None => self
                .nodes
                .push(Node::Select(ClauseNode::with(vec![Node::Distinct]))),
        }
        self
    }

    pub fn distinct_on(mut self, columns: Vec<Node>) -> Self {
        let marker = Node::DistinctOn(ClauseNode::with(columns));
        match self.select_clause() {
            Some(sel) => sel.children.insert(0, marker),
            None => self.nodes.push(Node::Select(ClauseNode::with(vec![marker]))),
        }
        self
    }

    pub fn from(mut self, target: impl Into<Node>) -> Self {
        self.nodes
            .push(Node::From(ClauseNode::with(vec![target.into()])));
        self
    }

    pub fn join(mut self, kind: JoinKind, table: impl Into<Node>, on: Node) -> Self {
        self.nodes.push(Node::Join(JoinNode {
            kind,
            table: Box::new(table.into()),
            on: Box::new(on),
        }));
        self
    }

    /// Adds a WHERE condition. Conditions accumulated on one WHERE
    /// clause render joined by AND.
    pub fn filter(mut self, condition: Node) -> Self {
        match self.where_clause() {
            Some(w) => w.children.push(condition),
            None => self
                .nodes
                .push(Node::Where(ClauseNode::with(vec![condition]))),
        }
        self
    }

    /// ORs the condition into the last WHERE condition.
    pub fn or_filter(mut self, condition: Node) -> Self {
        match self.where_clause() {
            Some(w) => match w.children.pop() {
                Some(last) => {
                    w.children.push(Node::Binary(BinaryNode {
                        left: Box::new(last),
                        op: "OR".to_string(),
                        right: Rhs::Node(Box::new(condition)),
                    }));
                }
                None => w.children.push(condition),
            },
            None => {
                self.nodes
                    .push(Node::Where(ClauseNode::with(vec![condition])));
            }
        }
        self
    }

    pub fn group_by(mut self, columns: Vec<Node>) -> Self {
        self.nodes.push(Node::GroupBy(ClauseNode::with(columns)));
        self
    }

    pub fn having(mut self, condition: Node) -> Self {
        self.nodes
            .push(Node::Having(ClauseNode::with(vec![condition])));
        self
    }

    pub fn order_by(mut self, items: Vec<Node>) -> Self {
        self.nodes.push(Node::OrderBy(ClauseNode::with(items)));
        self
    }

    pub fn limit(mut self, count: impl Into<Operand>) -> Self {
        self.nodes.push(Node::Limit(ModifierNode {
            count: Box::new(count.into().into_node()),
        }));
        self
    }

    pub fn offset(mut self, count: impl Into<Operand>) -> Self {
        self.nodes.push(Node::Offset(ModifierNode {
            count: Box::new(count.into().into_node()),
        }));
        self
    }

    pub fn returning(mut self, columns: Vec<Node>) -> Self {
        self.nodes.push(Node::Returning(ClauseNode::with(columns)));
        self
    }

    /// INSERT with a column list and value rows. An empty column list
    /// renders DEFAULT VALUES on the dialects that have it.
    pub fn insert(mut self, columns: Vec<Node>, rows: Vec<Vec<Node>>) -> Self {
        self.nodes.push(Node::Insert(insert_children(columns, rows)));
        self
    }

    pub fn replace(mut self, columns: Vec<Node>, rows: Vec<Vec<Node>>) -> Self {
        self.nodes
            .push(Node::Replace(insert_children(columns, rows)));
        self
    }

    pub fn update(mut self, assignments: Vec<(Node, Node)>) -> Self {
        let children = assignments
            .into_iter()
            .map(|(col, val)| {
                Node::Binary(BinaryNode {
                    left: Box::new(col),
                    op: "=".to_string(),
                    right: Rhs::Node(Box::new(val)),
                })
            })
            .collect();
        self.nodes.push(Node::Update(ClauseNode::with(children)));
        self
    }

    pub fn delete(mut self) -> Self {
        self.nodes.push(Node::Delete(ClauseNode::default()));
        self
    }

    pub fn create(mut self, definitions: Vec<Node>) -> Self {
        self.nodes.push(Node::Create(ClauseNode::with(definitions)));
        self
    }

    pub fn create_view(mut self, name: &str) -> Self {
        self.nodes.push(Node::CreateView(CreateViewNode {
            name: name.to_string(),
        }));
        self
    }

    pub fn drop(mut self) -> Self {
        self.nodes.push(Node::Drop(ClauseNode::default()));
        self
    }

    pub fn alter(mut self, operations: Vec<Node>) -> Self {
        self.nodes.push(Node::Alter(ClauseNode::with(operations)));
        self
    }

    pub fn truncate(mut self) -> Self {
        self.nodes.push(Node::Truncate);
        self
    }

    pub fn indexes(mut self) -> Self {
        self.nodes.push(Node::Indexes);
        self
    }

    pub fn create_index(mut self, index: CreateIndexNode) -> Self {
        self.nodes.push(Node::CreateIndex(index));
        self
    }

    pub fn drop_index(mut self, index: DropIndexNode) -> Self {
        self.nodes.push(Node::DropIndex(index));
        self
    }

    /// Prepends the IF EXISTS marker to the DROP clause.
    pub fn if_exists(mut self) -> Self {
        if let Some(Node::Drop(n)) = self.find_clause(|n| matches!(n, Node::Drop(_))) {
            n.children.insert(0, Node::IfExists);
        }
        self
    }

    /// Prepends the IF NOT EXISTS marker to the CREATE clause.
    pub fn if_not_exists(mut self) -> Self {
        if let Some(Node::Create(n)) = self.find_clause(|n| matches!(n, Node::Create(_))) {
            n.children.insert(0, Node::IfNotExists);
        }
        self
    }

    /// Prepends the OR IGNORE marker to the INSERT clause.
    pub fn or_ignore(mut self) -> Self {
        if let Some(Node::Insert(n)) = self.find_clause(|n| matches!(n, Node::Insert(_))) {
            n.children.insert(0, Node::OrIgnore);
        }
        self
    }

    pub fn cascade(mut self) -> Self {
        if let Some(Node::Drop(n)) = self.find_clause(|n| matches!(n, Node::Drop(_))) {
            n.children.push(Node::Cascade);
        }
        self
    }

    pub fn restrict(mut self) -> Self {
        if let Some(Node::Drop(n)) = self.find_clause(|n| matches!(n, Node::Drop(_))) {
            n.children.push(Node::Restrict);
        }
        self
    }

    pub fn on_conflict(mut self, conflict: OnConflictNode) -> Self {
        self.nodes.push(Node::OnConflict(conflict));
        self
    }

    pub fn on_duplicate(mut self, assignments: Vec<(Node, Node)>) -> Self {
        let children = assignments
            .into_iter()
            .map(|(col, val)| {
                Node::Binary(BinaryNode {
                    left: Box::new(col),
                    op: "=".to_string(),
                    right: Rhs::Node(Box::new(val)),
                })
            })
            .collect();
        self.nodes.push(Node::OnDuplicate(ClauseNode::with(children)));
        self
    }

    pub fn for_update(mut self) -> Self {
        self.nodes.push(Node::ForUpdate);
        self
    }

    pub fn for_share(mut self) -> Self {
        self.nodes.push(Node::ForShare);
        self
    }

    pub fn as_of(mut self, expr: impl Into<Node>) -> Self {
        self.nodes.push(Node::AsOf(Box::new(expr.into())));
        self
    }

    /// A column handle qualified by this query's table.
    pub fn column(&self, name: &str) -> Node {
        Node::Column(ColumnNode::qualified(&self.table.name, name))
    }

    pub fn into_subquery(self) -> Node {
        Node::Subquery(self)
    }

    fn select_clause(&mut self) -> Option<&mut ClauseNode> {
        self.nodes.iter_mut().find_map(|n| match n {
            Node::Select(sel) => Some(sel),
            _ => None,
        })
    }

    fn where_clause(&mut self) -> Option<&mut ClauseNode> {
        self.nodes.iter_mut().find_map(|n| match n {
            Node::Where(w) => Some(w),
            _ => None,
        })
    }

    fn find_clause(&mut self, pred: impl Fn(&Node) -> bool) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| pred(n))
    }
}

fn insert_children(columns: Vec<Node>, rows: Vec<Vec<Node>>) -> ClauseNode {
    let mut children = columns;
    children.extend(rows.into_iter().map(|row| Node::RowCall(ClauseNode::with(row))));
    ClauseNode { children }
}
