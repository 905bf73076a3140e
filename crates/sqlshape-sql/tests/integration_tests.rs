//! Integration tests for statement augmentation

use pretty_assertions::assert_eq;
use sqlshape_core::{AugmentScope, Config, DialectConfig, SqlValue};
use sqlshape_sql::{BuildError, Builder, DirectiveError, RewriteError, Rewriter};

const USERS: &str = "SELECT * FROM users";

fn texts(values: &[&str]) -> Vec<SqlValue> {
    values.iter().map(|v| SqlValue::from(*v)).collect()
}

// =============================================================================
// Single augmentations
// =============================================================================

#[test]
fn where_placeholder() {
    let out = Builder::new()
        .and_where("email = ?", ["john@example.com"])
        .build(USERS, vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users WHERE email = ?");
    assert_eq!(out.args, texts(&["john@example.com"]));
}

#[test]
fn where_on_name_column_is_quoted() {
    let out = Builder::new()
        .and_where("name = ?", ["John"])
        .build(USERS, vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users WHERE `name` = ?");
    assert_eq!(out.args, texts(&["John"]));
}

#[test]
fn chained_augmentations_on_name_column() {
    let out = Builder::new()
        .and_where("name = ?", ["John"])
        .where_in("age", [25, 30, 35])
        .order_by("name ASC, age DESC")
        .offset(10)
        .limit(5)
        .build(USERS, vec![])
        .unwrap();

    assert_eq!(
        out.sql,
        "SELECT * FROM users WHERE `name` = ? AND age IN (?, ?, ?) ORDER BY `name` ASC, age DESC LIMIT 5 OFFSET 10"
    );
    assert_eq!(
        out.args,
        vec![
            SqlValue::from("John"),
            SqlValue::Int(25),
            SqlValue::Int(30),
            SqlValue::Int(35),
        ]
    );
}

#[test]
fn where_on_keyword_column_is_quoted() {
    let out = Builder::new()
        .and_where("order = ?", [3])
        .build(USERS, vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users WHERE `order` = ?");
}

#[test]
fn where_on_qualified_column() {
    let out = Builder::new()
        .and_where("u.age >= ?", [21])
        .build("SELECT u.id FROM users AS u", vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT u.id FROM users AS u WHERE u.age >= ?");
}

#[test]
fn where_in() {
    let out = Builder::new()
        .where_in("age", [25, 30, 35])
        .build(USERS, vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users WHERE age IN (?, ?, ?)");
    assert_eq!(
        out.args,
        vec![SqlValue::Int(25), SqlValue::Int(30), SqlValue::Int(35)]
    );
}

#[test]
fn order_by() {
    let out = Builder::new()
        .order_by("email ASC, age DESC")
        .build(USERS, vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users ORDER BY email ASC, age DESC");
    assert!(out.args.is_empty());
}

#[test]
fn order_by_replaces_existing_clause() {
    let out = Builder::new()
        .order_by("age DESC")
        .build("SELECT * FROM users ORDER BY id", vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users ORDER BY age DESC");
}

#[test]
fn group_by() {
    let out = Builder::new()
        .group_by("country, u.dept")
        .build("SELECT country, COUNT(*) FROM users AS u", vec![])
        .unwrap();

    assert_eq!(
        out.sql,
        "SELECT country, COUNT(*) FROM users AS u GROUP BY country, u.dept"
    );
}

#[test]
fn offset_alone() {
    let out = Builder::new().offset(10).build(USERS, vec![]).unwrap();
    assert_eq!(out.sql, "SELECT * FROM users LIMIT 100 OFFSET 10");
}

#[test]
fn limit_alone() {
    let out = Builder::new().limit(5).build(USERS, vec![]).unwrap();
    assert_eq!(out.sql, "SELECT * FROM users LIMIT 5 OFFSET 0");
}

#[test]
fn mysql_comma_limit_is_merged() {
    let out = Builder::new()
        .limit(5)
        .build("SELECT * FROM users LIMIT 20, 50", vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users LIMIT 5 OFFSET 20");
}

// =============================================================================
// Chaining and arguments
// =============================================================================

#[test]
fn chained_augmentations() {
    let out = Builder::new()
        .and_where("email = ?", ["john@example.com"])
        .where_in("age", [25, 30, 35])
        .order_by("email ASC, age DESC")
        .offset(10)
        .limit(5)
        .build(USERS, vec![])
        .unwrap();

    assert_eq!(
        out.sql,
        "SELECT * FROM users WHERE email = ? AND age IN (?, ?, ?) ORDER BY email ASC, age DESC LIMIT 5 OFFSET 10"
    );
    assert_eq!(
        out.args,
        vec![
            SqlValue::from("john@example.com"),
            SqlValue::Int(25),
            SqlValue::Int(30),
            SqlValue::Int(35),
        ]
    );
}

#[test]
fn base_args_come_first() {
    let out = Builder::new()
        .where_in("country", ["NL", "BE"])
        .and_where("age > ?", [18])
        .build(
            "SELECT * FROM users WHERE active = ? AND tenant_id = ?",
            vec![SqlValue::Bool(true), SqlValue::Int(9)],
        )
        .unwrap();

    assert_eq!(
        out.sql,
        "SELECT * FROM users WHERE active = ? AND tenant_id = ? AND country IN (?, ?) AND age > ?"
    );
    assert_eq!(
        out.args,
        vec![
            SqlValue::Bool(true),
            SqlValue::Int(9),
            SqlValue::from("NL"),
            SqlValue::from("BE"),
            SqlValue::Int(18),
        ]
    );
}

#[test]
fn base_args_misalign_with_inner_blocks() {
    let sql = "SELECT * FROM (SELECT * FROM orders) AS o WHERE o.tenant = ?";
    let builder = Builder::new().and_where("age > ?", [18]);

    // Every block is augmented; base args still come first, so the
    // derived table's `?` is paired with the tenant value.
    let out = builder.build(sql, vec![SqlValue::Int(42)]).unwrap();
    assert_eq!(
        out.sql,
        "SELECT * FROM (SELECT * FROM orders WHERE age > ?) AS o WHERE o.tenant = ? AND age > ?"
    );
    assert_eq!(
        out.args,
        vec![SqlValue::Int(42), SqlValue::Int(18), SqlValue::Int(18)]
    );

    let out = builder
        .scope(AugmentScope::Outermost)
        .build(sql, vec![SqlValue::Int(42)])
        .unwrap();
    assert_eq!(
        out.sql,
        "SELECT * FROM (SELECT * FROM orders) AS o WHERE o.tenant = ? AND age > ?"
    );
    assert_eq!(out.args, vec![SqlValue::Int(42), SqlValue::Int(18)]);
}

#[test]
fn arg_count_is_base_plus_directives() {
    let cases: Vec<(Builder, usize)> = vec![
        (Builder::new(), 0),
        (Builder::new().and_where("age > ?", [1]), 1),
        (Builder::new().where_in("id", [1, 2, 3, 4]), 4),
        (
            Builder::new()
                .and_where("age NOT IN (?, ?)", [1, 2])
                .where_in("id", [3])
                .and_where("email LIKE ?", ["%@x.io"]),
            4,
        ),
    ];

    for (builder, directive_args) in cases {
        let out = builder
            .build("SELECT * FROM users WHERE id > ?", vec![SqlValue::Int(0)])
            .unwrap();
        assert_eq!(out.args.len(), 1 + directive_args);
        assert_eq!(out.args[0], SqlValue::Int(0));
        assert_eq!(out.sql.matches('?').count(), out.args.len());
    }
}

// =============================================================================
// Injection attempts
// =============================================================================

#[test]
fn order_injection_is_dropped() {
    let cases = [
        ("email ASC; DROP TABLE users", "SELECT * FROM users ORDER BY email ASC"),
        ("email ASC --, age ASC", "SELECT * FROM users ORDER BY email ASC, age ASC"),
        ("email --, age", "SELECT * FROM users ORDER BY email ASC, age ASC"),
        (
            "email ASC, age DESC; DROP TABLE users",
            "SELECT * FROM users ORDER BY email ASC, age ASC",
        ),
    ];

    for (spec, expected) in cases {
        let out = Builder::new().order_by(spec).build(USERS, vec![]).unwrap();
        assert_eq!(out.sql, expected, "spec: {}", spec);
        assert!(!out.sql.contains("DROP"));
        assert!(!out.sql.contains("--"));
    }
}

#[test]
fn column_injection_is_quoted() {
    let out = Builder::new()
        .where_in("id) OR (1=1", [1])
        .build(USERS, vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users WHERE `id) OR (1=1` IN (?)");
}

#[test]
fn value_injection_is_rejected() {
    let err = Builder::new()
        .and_where("age = 1 OR 1=1", Vec::<SqlValue>::new())
        .build(USERS, vec![])
        .unwrap_err();

    assert!(matches!(
        err.directive_error(),
        Some(DirectiveError::UnsupportedValue { .. })
    ));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn unparsable_base_query() {
    let err = Builder::new()
        .and_where("age > ?", [1])
        .build("SELEC * FROM", vec![])
        .unwrap_err();

    assert!(err.is_parse_error());
}

#[test]
fn unsupported_operator_aborts_build() {
    let err = Builder::new()
        .and_where("email = ?", ["a"])
        .and_where("age <> ?", [1])
        .build(USERS, vec![])
        .unwrap_err();

    assert!(matches!(
        err,
        BuildError::Aborted(RewriteError::InvalidDirective(
            DirectiveError::UnsupportedOperator { .. }
        ))
    ));
}

#[test]
fn deferred_group_error_aborts_build() {
    let err = Builder::new()
        .group_by("country, a.b.c")
        .build(USERS, vec![])
        .unwrap_err();

    assert_eq!(
        err.directive_error(),
        Some(&DirectiveError::InvalidColumn("a.b.c".to_string()))
    );
}

#[test]
fn unsupported_existing_where_aborts_build() {
    let err = Builder::new()
        .and_where("age > ?", [1])
        .build("SELECT * FROM users WHERE age BETWEEN 1 AND 5", vec![])
        .unwrap_err();

    assert!(matches!(
        err,
        BuildError::Aborted(RewriteError::UnsupportedExpression(_))
    ));
}

// =============================================================================
// Reuse, scope and dialects
// =============================================================================

#[test]
fn build_is_idempotent() {
    let builder = Builder::new()
        .and_where("email = ?", ["john@example.com"])
        .where_in("age", [25, 30])
        .group_by("country")
        .order_by("age DESC")
        .offset(20);

    let first = builder.build(USERS, vec![]).unwrap();
    let second = builder.build(USERS, vec![]).unwrap();

    assert_eq!(first, second);
}

#[test]
fn concurrent_builds_share_one_builder() {
    let builder = Builder::new().and_where("age > ?", [18]).limit(10);
    let expected = builder.build(USERS, vec![]).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| builder.build(USERS, vec![]).unwrap()))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn scope_from_config() {
    let config = Config {
        scope: AugmentScope::Outermost,
        default_row_count: 15,
        ..Config::default()
    };

    let builder = Builder::from_config(&config).and_where("age > ?", [18]).offset(5);
    let out = Rewriter::from_config(&config)
        .rewrite(&builder, "SELECT * FROM (SELECT * FROM users) AS u", vec![])
        .unwrap();

    assert_eq!(
        out.sql,
        "SELECT * FROM (SELECT * FROM users) AS u WHERE age > ? LIMIT 15 OFFSET 5"
    );
}

#[test]
fn postgres_dialect_quotes_with_double_quotes() {
    let config = Config {
        dialect: DialectConfig::Postgres,
        ..Config::default()
    };

    let builder = Builder::new().and_where("from = ?", ["x"]);
    let out = Rewriter::from_config(&config)
        .rewrite(&builder, USERS, vec![])
        .unwrap();

    assert_eq!(out.sql, "SELECT * FROM users WHERE \"from\" = ?");
}

#[test]
fn cte_bodies_are_augmented() {
    let out = Builder::new()
        .and_where("age > ?", [18])
        .build("WITH adults AS (SELECT * FROM users) SELECT * FROM adults", vec![])
        .unwrap();

    assert_eq!(
        out.sql,
        "WITH adults AS (SELECT * FROM users WHERE age > ?) SELECT * FROM adults WHERE age > ?"
    );
    assert_eq!(out.args, vec![SqlValue::Int(18), SqlValue::Int(18)]);
}
