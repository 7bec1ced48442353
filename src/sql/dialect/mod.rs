//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the dialect differences
//! that matter to aggregation queries:
//!
//! - Identifier quoting: `"` for every supported backend
//! - Bound parameter placeholders: `$n` (PostgreSQL/DuckDB) vs `?n` (SQLite)
//! - Membership in a list bound as a single parameter
//! - String literal escaping
//!
//! # Usage
//!
//! ```ignore
//! use tally::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("articles");  // "articles"
//! let slot = dialect.placeholder(1);                  // $1
//! ```
//!
//! Every supported dialect must provide `date_trunc(text, timestamp)`.
//! PostgreSQL and DuckDB ship it natively; the SQLite backend registers it
//! as a scalar function when the connection is opened.

mod duckdb;
pub mod helpers;
mod postgres;
mod sqlite;

pub use duckdb::DuckDb;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use serde::{Deserialize, Serialize};

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Render the placeholder for the `index`-th bound parameter (1-based).
    fn placeholder(&self, index: usize) -> String;

    /// Render the right-hand side of a membership test against an integer
    /// list bound to `placeholder`.
    ///
    /// The list always occupies exactly one parameter slot, so selections
    /// larger than the backend's bind-variable limit still compile.
    fn in_bound_list(&self, placeholder: &str) -> String;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    DuckDb,
    Sqlite,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
            Dialect::Sqlite => &Sqlite,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn in_bound_list(&self, placeholder: &str) -> String {
        self.dialect().in_bound_list(placeholder)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "duckdb" | "duck" => Ok(Dialect::DuckDb),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(format!(
                "unsupported dialect: {other}. Supported: postgres, duckdb, sqlite"
            )),
        }
    }
}
