//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that renders aggregation
//! statements for several backends. It includes:
//!
//! - [`query`] - SELECT query builder and compiled statements
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, col, count_distinct, func, lit_str, param_int, table_col, BinaryOperator, Expr, ExprExt,
    Literal,
};
pub use query::{CompiledQuery, Join, Query, TableRef};
pub use token::{Token, TokenStream};
