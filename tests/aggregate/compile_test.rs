use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use tally::aggregate::{
    compile_aggregate, Alias, AverageValue, Category, CodingSelection, Schema, Value,
};
use tally::error::AggregateError;
use tally::sql::{Dialect, Literal};

/// Same contract as the crate's internal `sql::test_utils::validate_sql`,
/// which is not visible to integration tests.
fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

fn average(field_id: i64, token: &str) -> Value {
    Value::Average(AverageValue::with_alias(field_id, Alias::new(token).unwrap()))
}

#[test]
fn test_medium_count_sqlite() {
    let compiled = compile_aggregate(
        &Schema::default(),
        Dialect::Sqlite,
        &[Category::medium()],
        &[Value::count()],
        &CodingSelection::new([3, 1, 2, 3]),
    )
    .unwrap();

    insta::assert_snapshot!(compiled.sql, @r#"
    SELECT
      "T_articles"."medium_id",
      COUNT(DISTINCT "T_articles"."article_id")
    FROM "codings_values" AS "T_codings_values"
    INNER JOIN "codings" AS "T_codings" ON "T_codings_values"."coding_id" = "T_codings"."coding_id"
    INNER JOIN "coded_articles" AS "T_coded_articles" ON "T_codings"."coded_article_id" = "T_coded_articles"."id"
    INNER JOIN "articles" AS "T_articles" ON "T_coded_articles"."article_id" = "T_articles"."article_id"
    WHERE ("T_codings_values"."coding_id" IN (SELECT "value" FROM json_each(?1)))
    GROUP BY "T_articles"."medium_id"
    "#);
    // Selection ids are de-duplicated and sorted.
    assert_eq!(compiled.params, vec![Literal::IntList(vec![1, 2, 3])]);
    validate_sql(&compiled.sql, Dialect::Sqlite).unwrap();
}

#[test]
fn test_average_without_categories_duckdb() {
    let compiled = compile_aggregate(
        &Schema::default(),
        Dialect::DuckDb,
        &[],
        &[average(7, "abc")],
        &CodingSelection::new([1]),
    )
    .unwrap();

    insta::assert_snapshot!(compiled.sql, @r#"
    SELECT
      AVG("Tabc_codings_values"."intval")
    FROM "codings_values" AS "T_codings_values"
    INNER JOIN "codings" AS "T_codings" ON "T_codings_values"."coding_id" = "T_codings"."coding_id"
    INNER JOIN "coded_articles" AS "T_coded_articles" ON "T_codings"."coded_article_id" = "T_coded_articles"."id"
    INNER JOIN "articles" AS "T_articles" ON "T_coded_articles"."article_id" = "T_articles"."article_id"
    INNER JOIN "codings_values" AS "Tabc_codings_values" ON "T_codings"."coding_id" = "Tabc_codings_values"."coding_id"
    WHERE ("T_codings_values"."coding_id" IN (SELECT UNNEST($1))) AND ("Tabc_codings_values"."field_id" = $2)
    "#);
    assert_eq!(
        compiled.params,
        vec![Literal::IntList(vec![1]), Literal::Int(7)]
    );
    validate_sql(&compiled.sql, Dialect::DuckDb).unwrap();
}

#[test]
fn test_selection_size_does_not_change_placeholders() {
    for dialect in [Dialect::Postgres, Dialect::DuckDb, Dialect::Sqlite] {
        let compile = |selection: CodingSelection| {
            compile_aggregate(
                &Schema::default(),
                dialect,
                &[Category::medium()],
                &[Value::count()],
                &selection,
            )
            .unwrap()
        };
        let small = compile(CodingSelection::new([1]));
        let large = compile(CodingSelection::new(1..=100_000));

        assert_eq!(small.sql, large.sql);
        assert_eq!(large.params.len(), 1);
        validate_sql(&large.sql, dialect).unwrap();
    }
}

#[test]
fn test_two_averages_get_separate_joins() {
    let values = [Value::average(7), Value::average(7)];
    let compiled = compile_aggregate(
        &Schema::default(),
        Dialect::Postgres,
        &[],
        &values,
        &CodingSelection::new([1, 2]),
    )
    .unwrap();

    for value in &values {
        let alias = value.alias().table_alias("codings_values");
        let join = format!("INNER JOIN \"codings_values\" AS \"{alias}\"");
        assert_eq!(compiled.sql.matches(&join).count(), 1, "{alias} joined once");
        assert!(compiled.sql.contains(&format!("AVG(\"{alias}\".\"intval\")")));
    }
    validate_sql(&compiled.sql, Dialect::Postgres).unwrap();
}

#[test]
fn test_every_granularity_compiles() {
    for dialect in [Dialect::Postgres, Dialect::DuckDb, Dialect::Sqlite] {
        for granularity in tally::aggregate::Granularity::ALL {
            let compiled = compile_aggregate(
                &Schema::default(),
                dialect,
                &[Category::interval(granularity.as_str()).unwrap()],
                &[Value::count()],
                &CodingSelection::new([1]),
            )
            .unwrap();
            assert!(compiled
                .sql
                .contains(&format!("DATE_TRUNC('{granularity}', \"T_articles\".\"date\")")));
            validate_sql(&compiled.sql, dialect).unwrap();
        }
    }
}

#[test]
fn test_unknown_granularity() {
    let err = Category::interval("fortnight").unwrap_err();
    assert!(matches!(err, AggregateError::InvalidArgument(_)));
    // Injection attempts never reach SQL.
    assert!(Category::interval("month'); DROP TABLE articles; --").is_err());
}

#[test]
fn test_custom_schema_table_names() {
    let schema = Schema {
        coding_values: "cv".to_string(),
        articles: "docs".to_string(),
        ..Schema::default()
    };
    let compiled = compile_aggregate(
        &schema,
        Dialect::Postgres,
        &[Category::coded_field(2)],
        &[average(3, "q")],
        &CodingSelection::new([1]),
    )
    .unwrap();

    assert!(compiled.sql.contains("FROM \"cv\" AS \"T_codings_values\""));
    assert!(compiled.sql.contains("INNER JOIN \"docs\" AS \"T_articles\""));
    assert!(compiled.sql.contains("INNER JOIN \"cv\" AS \"Tq_codings_values\""));
    validate_sql(&compiled.sql, Dialect::Postgres).unwrap();
}

#[test]
fn test_parsed_specs_compile_like_constructed_ones() {
    let parsed: Vec<Category> = ["interval:week", "medium", "field:12"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let constructed = vec![
        Category::interval("week").unwrap(),
        Category::medium(),
        Category::coded_field(12),
    ];
    assert_eq!(parsed, constructed);

    let compile = |categories: &[Category]| {
        compile_aggregate(
            &Schema::default(),
            Dialect::Postgres,
            categories,
            &[Value::count()],
            &CodingSelection::new([5]),
        )
        .unwrap()
    };
    assert_eq!(compile(&parsed), compile(&constructed));
}
