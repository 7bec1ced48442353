//! SQLite SQL dialect.
//!
//! - ANSI identifier quoting (`"`)
//! - Numbered `?n` parameters
//! - Id lists bound as JSON text and expanded with `json_each`
//! - No native `date_trunc`; [`crate::backend::SqliteBackend`] registers one

use super::helpers;
use super::SqlDialect;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_question(index)
    }

    fn in_bound_list(&self, placeholder: &str) -> String {
        helpers::in_json_each(placeholder)
    }
}
