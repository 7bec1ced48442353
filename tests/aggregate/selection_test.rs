use tally::aggregate::{CodingSelection, Schema};
use tally::backend::SqliteBackend;
use tally::sql::Dialect;

fn fixture() -> SqliteBackend {
    let backend = SqliteBackend::open_in_memory(Schema::default()).unwrap();
    backend.create_schema().unwrap();
    backend
        .connection()
        .execute_batch(
            r#"
            INSERT INTO articles (article_id, date, medium_id) VALUES
                (100, '2024-01-01', NULL), (101, '2024-01-02', NULL);

            INSERT INTO coded_articles (id, article_id, codingjob_id) VALUES
                (10, 100, 1), (11, 101, 1), (12, 100, 2);

            INSERT INTO codings (coding_id, coded_article_id) VALUES
                (1, 10), (2, 10), (3, 11), (4, 12);
            "#,
        )
        .unwrap();
    backend
}

#[test]
fn test_from_articles_filters_by_article_and_job() {
    let backend = fixture();
    let schema = Schema::default();

    let selection =
        CodingSelection::from_articles(&backend, &schema, Dialect::Sqlite, &[100], &[1]).unwrap();
    assert_eq!(selection.ids(), &[1, 2]);

    let selection =
        CodingSelection::from_articles(&backend, &schema, Dialect::Sqlite, &[100, 101], &[1, 2])
            .unwrap();
    assert_eq!(selection.ids(), &[1, 2, 3, 4]);

    let selection =
        CodingSelection::from_articles(&backend, &schema, Dialect::Sqlite, &[101], &[2]).unwrap();
    assert!(selection.is_empty());
}

#[test]
fn test_from_articles_beyond_variable_limit() {
    let backend = fixture();
    let articles: Vec<i64> = (1..=40_000).collect();

    let selection = CodingSelection::from_articles(
        &backend,
        &Schema::default(),
        Dialect::Sqlite,
        &articles,
        &[1],
    )
    .unwrap();
    assert_eq!(selection.ids(), &[1, 2, 3]);
}

#[test]
fn test_from_articles_empty_inputs_skip_query() {
    // Without tables any query would fail.
    let backend = SqliteBackend::open_in_memory(Schema::default()).unwrap();
    let schema = Schema::default();

    let selection =
        CodingSelection::from_articles(&backend, &schema, Dialect::Sqlite, &[], &[1]).unwrap();
    assert!(selection.is_empty());
    let selection =
        CodingSelection::from_articles(&backend, &schema, Dialect::Sqlite, &[100], &[]).unwrap();
    assert!(selection.is_empty());
}
