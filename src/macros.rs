//! Construction macros for the common node shapes.

/// A PARAMETER node holding the value.
#[macro_export]
macro_rules! param {
    ($v:expr) => {
        $crate::ast::Node::Parameter($crate::value::Value::from($v))
    };
}

/// A COLUMN node, bare or table-qualified.
#[macro_export]
macro_rules! column {
    ($name:expr) => {
        $crate::ast::Node::Column($crate::ast::ColumnNode::new($name))
    };
    ($table:expr, $name:expr) => {
        $crate::ast::Node::Column($crate::ast::ColumnNode::qualified($table, $name))
    };
}

/// A qualified COLUMN node with an alias.
#[macro_export]
macro_rules! column_as {
    ($table:expr, $name:expr, $alias:expr) => {{
        let mut col = $crate::ast::ColumnNode::qualified($table, $name);
        col.alias = Some($alias.to_string());
        $crate::ast::Node::Column(col)
    }};
}

/// A table reference, optionally schema-qualified.
#[macro_export]
macro_rules! table_ref {
    ($name:expr) => {
        $crate::ast::TableRef::new($name)
    };
    ($schema:expr, $name:expr) => {
        $crate::ast::TableRef::with_schema($schema, $name)
    };
}

/// A FUNCTION CALL node; arguments accept anything convertible to a
/// node.
#[macro_export]
macro_rules! func {
    ($name:expr $(, $arg:expr)* $(,)?) => {
        $crate::ast::Node::FunctionCall($crate::ast::FunctionCallNode {
            name: $name.to_string(),
            args: vec![$($arg.into()),*],
        })
    };
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{stmt::QueryNode, Node},
        render::render,
        value::Value,
    };

    #[test]
    fn test_column_macro_forms() {
        let bare = column!("id");
        assert!(matches!(bare, Node::Column(c) if c.table.is_none() && c.name == "id"));

        let qualified = column!("users", "id");
        assert!(matches!(qualified, Node::Column(c) if c.table.as_deref() == Some("users")));

        let aliased = column_as!("users", "id", "user_id");
        assert!(matches!(aliased, Node::Column(c) if c.alias.as_deref() == Some("user_id")));
    }

    #[test]
    fn test_param_macro_wraps_value() {
        assert_eq!(param!(42), Node::Parameter(Value::Int(42)));
        assert_eq!(param!("x"), Node::Parameter(Value::String("x".to_string())));
    }

    #[test]
    fn test_func_macro_renders() {
        let query = Node::Query(
            QueryNode::new(table_ref!("users")).select(vec![func!("LOWER", column!("users", "name"))]),
        );
        let rendered = render(&query, None).unwrap();
        assert_eq!(rendered.text, r#"SELECT LOWER("users"."name") FROM "users""#);
    }

    #[test]
    fn test_table_ref_macro_with_schema() {
        let t = table_ref!("app", "users");
        assert_eq!(t.schema.as_deref(), Some("app"));
        assert_eq!(t.name, "users");
    }
}
