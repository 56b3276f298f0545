//! One tree, five dialects: end-to-end rendering comparisons.

use sqlgen::{query, render, Expression, Node, QueryError, Value};

#[test]
fn test_simple_filter_across_dialects() {
    let users = query("users");
    let stmt = Node::Query(
        query("users")
            .select(vec![users.column("id")])
            .filter(users.column("name").equals("Ada")),
    );

    let cases = [
        ("postgres", r#"SELECT "users"."id" FROM "users" WHERE ("users"."name" = $1)"#),
        ("mysql", "SELECT `users`.`id` FROM `users` WHERE (`users`.`name` = ?)"),
        ("sqlite", r#"SELECT "users"."id" FROM "users" WHERE ("users"."name" = $1)"#),
        ("mssql", "SELECT [users].[id] FROM [users] WHERE ([users].[name] = @1)"),
        ("oracle", r#"SELECT "users"."id" FROM "users" WHERE ("users"."name" = :1)"#),
    ];
    for (dialect, expected) in cases {
        let rendered = render(&stmt, Some(dialect)).unwrap();
        assert_eq!(rendered.text, expected, "{dialect}");
        assert_eq!(rendered.values, vec![Value::String("Ada".to_string())], "{dialect}");
    }
}

#[test]
fn test_add_columns_across_dialects() {
    let stmt = Node::Query(query("t").alter(vec![Node::AddColumn(
        sqlgen::ast::ClauseNode::with(vec![Node::from("col1 INT"), Node::from("col2 INT")]),
    )]));

    let cases = [
        ("postgres", r#"ALTER TABLE "t" ADD COLUMN col1 INT, ADD COLUMN col2 INT"#),
        ("mysql", "ALTER TABLE `t` ADD COLUMN col1 INT, ADD COLUMN col2 INT"),
        ("mssql", "ALTER TABLE [t] ADD col1 INT, col2 INT"),
        ("oracle", r#"ALTER TABLE "t" ADD (col1 INT, col2 INT)"#),
    ];
    for (dialect, expected) in cases {
        let rendered = render(&stmt, Some(dialect)).unwrap();
        assert_eq!(rendered.text, expected, "{dialect}");
    }
}

#[test]
fn test_pagination_across_dialects() {
    let items = query("items");
    let stmt = Node::Query(
        query("items")
            .select(vec![items.column("id")])
            .order_by(vec![items.column("id").ascending()])
            .limit(10)
            .offset(20),
    );

    let cases = [
        (
            "postgres",
            r#"SELECT "items"."id" FROM "items" ORDER BY "items"."id" ASC LIMIT $1 OFFSET $2"#,
            vec![Value::Int(10), Value::Int(20)],
        ),
        (
            "mysql",
            "SELECT `items`.`id` FROM `items` ORDER BY `items`.`id` ASC LIMIT ? OFFSET ?",
            vec![Value::Int(10), Value::Int(20)],
        ),
        (
            "mssql",
            "SELECT [items].[id] FROM [items] ORDER BY [items].[id] ASC OFFSET @1 ROWS FETCH NEXT @2 ROWS ONLY",
            vec![Value::Int(20), Value::Int(10)],
        ),
        (
            "oracle",
            r#"SELECT "items"."id" FROM "items" ORDER BY "items"."id" ASC OFFSET :2 ROWS FETCH NEXT :1 ROWS ONLY"#,
            vec![Value::Int(10), Value::Int(20)],
        ),
    ];
    for (dialect, expected, values) in cases {
        let rendered = render(&stmt, Some(dialect)).unwrap();
        assert_eq!(rendered.text, expected, "{dialect}");
        assert_eq!(rendered.values, values, "{dialect}");
    }
}

#[test]
fn test_truncate_across_dialects() {
    let stmt = Node::Query(query("t").truncate());

    let cases = [
        ("postgres", r#"TRUNCATE TABLE "t""#),
        ("mysql", "TRUNCATE TABLE `t`"),
        ("mssql", "TRUNCATE TABLE [t]"),
        ("oracle", r#"TRUNCATE TABLE "t""#),
        ("sqlite", r#"DELETE FROM "t""#),
    ];
    for (dialect, expected) in cases {
        let rendered = render(&stmt, Some(dialect)).unwrap();
        assert_eq!(rendered.text, expected, "{dialect}");
    }
}

#[test]
fn test_current_timestamp_parens_across_dialects() {
    let stmt = Node::Query(query("t").select(vec![sqlgen::func("CURRENT_TIMESTAMP", vec![])]));

    let cases = [
        ("postgres", r#"SELECT CURRENT_TIMESTAMP() FROM "t""#),
        ("oracle", r#"SELECT CURRENT_TIMESTAMP() FROM "t""#),
        ("mysql", "SELECT CURRENT_TIMESTAMP FROM `t`"),
        ("sqlite", r#"SELECT CURRENT_TIMESTAMP FROM "t""#),
        ("mssql", "SELECT CURRENT_TIMESTAMP FROM [t]"),
    ];
    for (dialect, expected) in cases {
        let rendered = render(&stmt, Some(dialect)).unwrap();
        assert_eq!(rendered.text, expected, "{dialect}");
    }
}

#[test]
fn test_drop_if_exists_across_dialects() {
    let stmt = Node::Query(query("t").drop().if_exists());

    let rendered = render(&stmt, Some("sqlite")).unwrap();
    assert_eq!(rendered.text, r#"DROP TABLE IF EXISTS "t""#);

    let rendered = render(&stmt, Some("oracle")).unwrap();
    assert_eq!(
        rendered.text,
        r#"BEGIN EXECUTE IMMEDIATE 'DROP TABLE "t"'; EXCEPTION WHEN OTHERS THEN IF SQLCODE != -942 THEN RAISE; END IF; END;"#
    );

    let rendered = render(&stmt, Some("mssql")).unwrap();
    assert_eq!(
        rendered.text,
        "IF EXISTS(SELECT * FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = [t]) BEGIN DROP TABLE [t] END"
    );
}

#[test]
fn test_array_comparison_support_matrix() {
    let t = query("t");
    let stmt = Node::Query(
        query("t")
            .select(vec![t.column("id")])
            .filter(t.column("tags").equals(vec![1i64, 2])),
    );

    for dialect in ["postgres", "mysql", "sqlite"] {
        assert!(render(&stmt, Some(dialect)).is_ok(), "{dialect}");
    }
    for dialect in ["mssql", "oracle"] {
        let err = render(&stmt, Some(dialect)).unwrap_err();
        assert!(
            matches!(err, QueryError::UnsupportedConstruct { .. }),
            "{dialect}"
        );
    }

    // IN keeps working everywhere.
    let stmt = Node::Query(
        query("t")
            .select(vec![t.column("id")])
            .filter(t.column("id").in_(vec![1i64, 2])),
    );
    for dialect in ["postgres", "mysql", "sqlite", "mssql", "oracle"] {
        assert!(render(&stmt, Some(dialect)).is_ok(), "{dialect}");
    }
}

#[test]
fn test_case_boolean_predicate_matrix() {
    let t = query("t");
    let expr = sqlgen::case(
        vec![Node::from(Value::Bool(true))],
        vec![Node::from(Value::from("yes"))],
        Some(Node::from(Value::from("no"))),
    )
    .unwrap();
    let stmt = Node::Query(query("t").select(vec![expr, t.column("id")]));

    let rendered = render(&stmt, Some("postgres")).unwrap();
    assert_eq!(
        rendered.text,
        r#"SELECT (CASE WHEN $1 THEN $2 ELSE $3 END), "t"."id" FROM "t""#
    );
    assert_eq!(rendered.values[0], Value::Bool(true));

    let rendered = render(&stmt, Some("mssql")).unwrap();
    assert_eq!(
        rendered.text,
        "SELECT (CASE WHEN 1=1 THEN @1 ELSE @2 END), [t].[id] FROM [t]"
    );

    let rendered = render(&stmt, Some("oracle")).unwrap();
    assert_eq!(
        rendered.text,
        r#"SELECT (CASE WHEN 1=1 THEN :1 ELSE :2 END), "t"."id" FROM "t""#
    );
}

#[test]
fn test_conflict_handling_matrix() {
    let insert = || {
        query("users").insert(
            vec![sqlgen::column("email")],
            vec![vec![Node::from(Value::from("a@b.c"))]],
        )
    };

    let on_conflict = Node::Query(insert().on_conflict(sqlgen::ast::OnConflictNode {
        target: Some(sqlgen::ast::ConflictTarget::Columns(vec!["email".to_string()])),
        update_columns: None,
    }));
    assert!(render(&on_conflict, Some("postgres")).is_ok());
    assert!(render(&on_conflict, Some("sqlite")).is_ok());
    for dialect in ["mysql", "mssql", "oracle"] {
        assert!(render(&on_conflict, Some(dialect)).is_err(), "{dialect}");
    }

    let on_duplicate = Node::Query(insert().on_duplicate(vec![(
        sqlgen::column("email"),
        Node::from(Value::from("a@b.c")),
    )]));
    assert!(render(&on_duplicate, Some("mysql")).is_ok());
    for dialect in ["postgres", "sqlite", "mssql", "oracle"] {
        assert!(render(&on_duplicate, Some(dialect)).is_err(), "{dialect}");
    }
}

#[test]
fn test_as_of_matrix() {
    let t = query("t");
    let stmt = Node::Query(
        query("t")
            .select(vec![t.column("id")])
            .as_of(Node::Text("'2024-01-01 00:00:00'".to_string())),
    );

    let rendered = render(&stmt, Some("postgres")).unwrap();
    assert_eq!(
        rendered.text,
        r#"SELECT "t"."id" FROM "t" AS OF SYSTEM TIME '2024-01-01 00:00:00'"#
    );

    let rendered = render(&stmt, Some("oracle")).unwrap();
    assert_eq!(
        rendered.text,
        r#"SELECT "t"."id" FROM "t" AS OF TIMESTAMP '2024-01-01 00:00:00'"#
    );

    for dialect in ["mysql", "sqlite", "mssql"] {
        assert!(render(&stmt, Some(dialect)).is_err(), "{dialect}");
    }
}

#[test]
fn test_subquery_in_filter() {
    let orders = query("orders");
    let users = query("users");
    let inner = query("orders")
        .select(vec![orders.column("user_id")])
        .filter(orders.column("total").gt(100));
    let stmt = Node::Query(
        query("users")
            .select(vec![users.column("id")])
            .filter(users.column("id").in_(inner.into_subquery())),
    );
    let rendered = render(&stmt, Some("postgres")).unwrap();
    assert_eq!(
        rendered.text,
        r#"SELECT "users"."id" FROM "users" WHERE ("users"."id" IN (SELECT "orders"."user_id" FROM "orders" WHERE ("orders"."total" > $1)))"#
    );

    let rendered = render(&stmt, Some("mssql")).unwrap();
    assert_eq!(
        rendered.text,
        "SELECT [users].[id] FROM [users] WHERE ([users].[id] IN (SELECT [orders].[user_id] FROM [orders] WHERE ([orders].[total] > @1)))"
    );
}

#[test]
fn test_named_query_round_trip_serialization() {
    let users = query("users");
    let stmt = Node::Query(
        query("users")
            .select(vec![users.column("id")])
            .filter(users.column("age").gt(21)),
    );
    let named = sqlgen::to_named_query(&stmt, "adults", Some("postgres")).unwrap();
    let json = serde_json::to_string(&named).unwrap();
    let back: sqlgen::NamedQuery = serde_json::from_str(&json).unwrap();
    assert_eq!(named, back);
    assert_eq!(back.name, "adults");
    assert_eq!(back.values, vec![Value::Int(21)]);
}
