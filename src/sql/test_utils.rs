//! Test utilities for SQL emission validation.
//!
//! Provides helpers for validating that emitted SQL is syntactically correct
//! using sqlparser-rs for roundtrip validation.

use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Validates that a SQL string is syntactically valid for the given dialect.
///
/// Uses sqlparser-rs to parse the SQL and returns an error if parsing fails.
///
/// # Example
///
/// ```ignore
/// use crate::sql::test_utils::validate_sql;
/// use crate::sql::dialect::Dialect;
///
/// let sql = "SELECT * FROM articles";
/// validate_sql(sql, Dialect::Postgres).unwrap();
/// ```
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT * FROM articles", Dialect::Postgres).unwrap();
        validate_sql("SELECT * FROM articles", Dialect::DuckDb).unwrap();
        validate_sql("SELECT * FROM articles WHERE id IN (?1, ?2)", Dialect::Sqlite).unwrap();
    }

    #[test]
    fn test_validate_bound_lists() {
        validate_sql("SELECT id FROM t WHERE id = ANY($1)", Dialect::Postgres).unwrap();
        validate_sql("SELECT id FROM t WHERE id IN (SELECT UNNEST($1))", Dialect::DuckDb).unwrap();
        validate_sql(
            "SELECT id FROM t WHERE id IN (SELECT \"value\" FROM json_each(?1))",
            Dialect::Sqlite,
        )
        .unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM articles", Dialect::Postgres);
        assert!(result.is_err());
    }
}
