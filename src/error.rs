//! Error types for aggregation and backend access.

use crate::model::Entity;

/// Errors raised by a relational backend while executing a statement or
/// decoding its rows.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to decode column value: {0}")]
    Decode(String),
}

/// Errors raised while building, executing or materializing an aggregation.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// Malformed fragment input, e.g. an unknown interval granularity.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Structurally invalid request, e.g. no values.
    #[error("Invalid aggregation: {0}")]
    Configuration(String),

    /// The compiler was asked to restrict to an empty coding selection.
    #[error("Coding selection is empty")]
    EmptySelection,

    #[error("Query execution failed: {source}\nSQL: {sql}")]
    QueryExecution {
        sql: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to resolve {entity} entities: {source}")]
    Resolution {
        entity: Entity,
        #[source]
        source: BackendError,
    },

    /// A referenced entity key has no row in its table.
    #[error("Integrity error: {entity} {key} is referenced but does not exist")]
    Integrity { entity: Entity, key: i64 },

    /// A result row did not have the shape the statement promised.
    #[error("Malformed result: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, AggregateError>;
