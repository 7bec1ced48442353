//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible for everything aggregation needs:
//! - ANSI identifier quoting (`"`)
//! - Numbered `$n` parameters
//! - List parameters expanded with `UNNEST`
//! - Native `date_trunc`

use super::helpers;
use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_dollar(index)
    }

    fn in_bound_list(&self, placeholder: &str) -> String {
        helpers::in_unnest(placeholder)
    }
}
