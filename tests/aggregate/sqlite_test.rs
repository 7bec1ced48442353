use std::collections::HashMap;

use chrono::NaiveDate;
use tally::aggregate::{
    AggregateRow, Aggregator, Category, CodingSelection, RowPart, Schema, Value,
};
use tally::backend::{EntityResolver, SqliteBackend};
use tally::error::{AggregateError, BackendError};
use tally::model::{Cell, Entity, EntityObject};
use tally::sql::Dialect;

/// Four articles over two media, each coded once in job 1, with a value
/// for field 7 and field 8 on every coding.
fn fixture() -> SqliteBackend {
    let backend = SqliteBackend::open_in_memory(Schema::default()).unwrap();
    backend.create_schema().unwrap();
    backend
        .connection()
        .execute_batch(
            r#"
            INSERT INTO media (medium_id, name) VALUES (1, 'medium1'), (2, 'medium2');

            INSERT INTO articles (article_id, date, medium_id) VALUES
                (100, '2024-01-15 09:30:00', 1),
                (101, '2024-01-20 18:00:00', 1),
                (102, '2024-02-03 07:15:00', 1),
                (103, '2024-02-28 23:59:59', 2);

            INSERT INTO coded_articles (id, article_id, codingjob_id) VALUES
                (10, 100, 1), (11, 101, 1), (12, 102, 1), (13, 103, 1);

            INSERT INTO codings (coding_id, coded_article_id) VALUES
                (1, 10), (2, 11), (3, 12), (4, 13);

            INSERT INTO codings_values (coding_id, field_id, intval) VALUES
                (1, 7, 2), (2, 7, 4), (3, 7, 6), (4, 7, 10),
                (1, 8, 1), (2, 8, 1), (3, 8, 2), (4, 8, 2);
            "#,
        )
        .unwrap();
    backend
}

fn aggregator(
    backend: &SqliteBackend,
    codings: impl IntoIterator<Item = i64>,
) -> Aggregator<'_, SqliteBackend, SqliteBackend> {
    Aggregator::new(backend, CodingSelection::new(codings)).with_dialect(Dialect::Sqlite)
}

fn medium(id: i64) -> Cell {
    Cell::Entity(EntityObject::new(Entity::Medium, id, format!("medium{id}")))
}

fn sorted(rows: impl Iterator<Item = AggregateRow>) -> Vec<AggregateRow> {
    let mut rows: Vec<_> = rows.collect();
    rows.sort_by_key(|row| format!("{:?}", row.categories));
    rows
}

#[test]
fn test_count_per_medium_flat() {
    let backend = fixture();
    let rows = aggregator(&backend, [1, 2, 3, 4])
        .flat(true)
        .aggregate(&[Category::medium()], &[Value::count()])
        .unwrap();

    assert_eq!(
        sorted(rows),
        vec![
            AggregateRow {
                categories: RowPart::Single(medium(1)),
                values: RowPart::Single(Cell::Int(3)),
            },
            AggregateRow {
                categories: RowPart::Single(medium(2)),
                values: RowPart::Single(Cell::Int(1)),
            },
        ]
    );
}

#[test]
fn test_average_without_categories() {
    let backend = fixture();
    let agg = aggregator(&backend, [1, 2, 3]);

    let rows: Vec<_> = agg.aggregate(&[], &[Value::average(7)]).unwrap().collect();
    assert_eq!(
        rows,
        vec![AggregateRow {
            categories: RowPart::Tuple(vec![]),
            values: RowPart::Tuple(vec![Cell::Float(4.0)]),
        }]
    );

    let flat: Vec<_> = agg
        .flat(true)
        .aggregate(&[], &[Value::average(7)])
        .unwrap()
        .collect();
    assert_eq!(flat[0].values, RowPart::Single(Cell::Float(4.0)));
    assert_eq!(flat[0].categories, RowPart::Tuple(vec![]));
}

#[test]
fn test_averages_on_different_fields() {
    let backend = fixture();
    let rows: Vec<_> = aggregator(&backend, [1, 2, 3, 4])
        .aggregate(
            &[],
            &[Value::count(), Value::average(7), Value::average(8)],
        )
        .unwrap()
        .collect();

    assert_eq!(
        rows,
        vec![AggregateRow {
            categories: RowPart::Tuple(vec![]),
            values: RowPart::Tuple(vec![Cell::Int(4), Cell::Float(5.5), Cell::Float(1.5)]),
        }]
    );
}

#[test]
fn test_selection_beyond_variable_limit() {
    let backend = fixture();
    // Only codings 1..=4 exist; the rest of the ids match nothing.
    let rows = aggregator(&backend, 1..=40_000)
        .flat(true)
        .aggregate(&[Category::medium()], &[Value::count()])
        .unwrap();

    assert_eq!(
        sorted(rows),
        vec![
            AggregateRow {
                categories: RowPart::Single(medium(1)),
                values: RowPart::Single(Cell::Int(3)),
            },
            AggregateRow {
                categories: RowPart::Single(medium(2)),
                values: RowPart::Single(Cell::Int(1)),
            },
        ]
    );
}

#[test]
fn test_repeated_aggregation_keeps_row_order() {
    let backend = fixture();
    let agg = aggregator(&backend, [1, 2, 3, 4]);
    let categories = [Category::coded_field(8), Category::medium()];
    let values = [Value::count(), Value::average(7)];

    let first: Vec<_> = agg.aggregate(&categories, &values).unwrap().collect();
    let second: Vec<_> = agg.aggregate(&categories, &values).unwrap().collect();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_empty_selection_yields_no_rows() {
    let backend = fixture();
    let rows = aggregator(&backend, [])
        .aggregate(&[Category::medium()], &[Value::count()])
        .unwrap();
    assert_eq!(rows.len(), 0);
}

#[test]
fn test_no_values_is_rejected() {
    let backend = fixture();
    let err = aggregator(&backend, [1])
        .aggregate(&[Category::medium()], &[])
        .unwrap_err();
    assert!(matches!(err, AggregateError::Configuration(_)));
}

#[test]
fn test_month_interval_groups() {
    let backend = fixture();
    let rows = aggregator(&backend, [1, 2, 3, 4])
        .flat(true)
        .aggregate(&[Category::interval("month").unwrap()], &[Value::count()])
        .unwrap();

    let month = |m| {
        Cell::Timestamp(
            NaiveDate::from_ymd_opt(2024, m, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    };
    let mut counts: Vec<_> = rows
        .map(|row| (row.categories, row.values.as_single().and_then(Cell::as_int)))
        .collect();
    counts.sort_by_key(|(c, _)| format!("{c:?}"));
    assert_eq!(
        counts,
        vec![
            (RowPart::Single(month(1)), Some(2)),
            (RowPart::Single(month(2)), Some(2)),
        ]
    );
}

#[test]
fn test_coded_field_with_count_and_average() {
    let backend = fixture();
    let rows = aggregator(&backend, [1, 2, 3, 4])
        .flat(true)
        .aggregate(
            &[Category::coded_field(8)],
            &[Value::count(), Value::average(7)],
        )
        .unwrap();

    assert_eq!(
        sorted(rows),
        vec![
            AggregateRow {
                categories: RowPart::Single(Cell::Int(1)),
                values: RowPart::Tuple(vec![Cell::Int(2), Cell::Float(3.0)]),
            },
            AggregateRow {
                categories: RowPart::Single(Cell::Int(2)),
                values: RowPart::Tuple(vec![Cell::Int(2), Cell::Float(8.0)]),
            },
        ]
    );
}

#[test]
fn test_medium_and_interval_together() {
    let backend = fixture();
    let rows: Vec<_> = aggregator(&backend, [1, 2, 3, 4])
        .aggregate(
            &[Category::medium(), Category::interval("year").unwrap()],
            &[Value::count()],
        )
        .unwrap()
        .collect();

    // medium1 and medium2, both in 2024.
    assert_eq!(rows.len(), 2);
    for row in &rows {
        let cells = row.categories.cells();
        assert_eq!(cells.len(), 2);
        assert!(cells[0].as_entity().is_some());
        assert_eq!(
            cells[1].as_timestamp().map(|ts| ts.to_string()),
            Some("2024-01-01 00:00:00".to_string())
        );
    }
}

/// Resolver that knows no entities at all.
struct NoEntities;

impl EntityResolver for NoEntities {
    fn resolve(
        &self,
        _entity: Entity,
        _keys: &[i64],
    ) -> Result<HashMap<i64, EntityObject>, BackendError> {
        Ok(HashMap::new())
    }
}

#[test]
fn test_unresolvable_entity_is_integrity_error() {
    let backend = fixture();
    let err = Aggregator::with_parts(&backend, &NoEntities, CodingSelection::new([4]))
        .with_dialect(Dialect::Sqlite)
        .aggregate(&[Category::medium()], &[Value::count()])
        .unwrap_err();

    assert!(matches!(
        err,
        AggregateError::Integrity {
            entity: Entity::Medium,
            key: 2
        }
    ));
}

#[test]
fn test_dangling_medium_reference() {
    let backend = fixture();
    backend
        .connection()
        .execute_batch(
            "INSERT INTO articles (article_id, date, medium_id) VALUES (104, '2024-03-01', 99);
             INSERT INTO coded_articles (id, article_id, codingjob_id) VALUES (14, 104, 1);
             INSERT INTO codings (coding_id, coded_article_id) VALUES (5, 14);
             INSERT INTO codings_values (coding_id, field_id, intval) VALUES (5, 7, 1);",
        )
        .unwrap();

    let err = aggregator(&backend, [1, 5])
        .aggregate(&[Category::medium()], &[Value::count()])
        .unwrap_err();
    assert!(matches!(err, AggregateError::Integrity { key: 99, .. }));
}

#[test]
fn test_execution_error_carries_sql() {
    let backend = SqliteBackend::open_in_memory(Schema::default()).unwrap();
    // No tables created.
    let err = aggregator(&backend, [1])
        .aggregate(&[], &[Value::count()])
        .unwrap_err();

    match err {
        AggregateError::QueryExecution { sql, source } => {
            assert!(sql.starts_with("SELECT"));
            assert!(matches!(source, BackendError::Sqlite(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_rows_serialize_to_json() {
    let backend = fixture();
    let rows: Vec<_> = aggregator(&backend, [4])
        .flat(true)
        .aggregate(&[Category::medium()], &[Value::count()])
        .unwrap()
        .collect();

    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "categories": {"entity": "medium", "id": 2, "name": "medium2"},
            "values": 1
        }])
    );
}
