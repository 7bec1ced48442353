//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB, SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Placeholders
// =============================================================================

/// Numbered dollar placeholder: `$1`, `$2`, ...
/// Used by: Postgres, DuckDB
pub fn placeholder_dollar(index: usize) -> String {
    format!("${index}")
}

/// Numbered question-mark placeholder: `?1`, `?2`, ...
/// Used by: SQLite
pub fn placeholder_question(index: usize) -> String {
    format!("?{index}")
}

// =============================================================================
// Bound Lists
// =============================================================================

/// `= ANY($n)` over an array parameter.
/// Used by: Postgres
pub fn any_array(placeholder: &str) -> String {
    format!("= ANY({placeholder})")
}

/// `IN (SELECT UNNEST($n))` over a list parameter.
/// Used by: DuckDB
pub fn in_unnest(placeholder: &str) -> String {
    format!("IN (SELECT UNNEST({placeholder}))")
}

/// `IN (SELECT "value" FROM json_each(?n))` over a JSON array parameter.
/// Used by: SQLite
pub fn in_json_each(placeholder: &str) -> String {
    format!("IN (SELECT \"value\" FROM json_each({placeholder}))")
}
