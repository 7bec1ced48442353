//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features relied on here:
//! - ANSI identifier quoting (`"`)
//! - Numbered `$n` parameters
//! - Array parameters, so id lists bind as `= ANY($n)`
//! - Native `date_trunc`

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_dollar(index)
    }

    fn in_bound_list(&self, placeholder: &str) -> String {
        helpers::any_array(placeholder)
    }
}
