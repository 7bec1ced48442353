//! # Tally
//!
//! Dynamic aggregation queries over coded articles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │         Categories + Values (aggregate fragments)        │
//! │   (interval, medium, coded field) x (count, average)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Query (token stream + bound parameters)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [backend]
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Raw rows                            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [materializer]
//! ┌─────────────────────────────────────────────────────────┐
//! │        (categories, values) rows, entities resolved      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod sql;

pub use error::{AggregateError, BackendError, Result};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::aggregate::{
        AggregateRow, AggregateRows, Aggregator, Category, CodingSelection, Granularity, RowPart,
        Schema, Value,
    };
    pub use crate::backend::{EntityResolver, Executor, SqliteBackend};
    pub use crate::error::{AggregateError, BackendError, Result};
    pub use crate::model::{Cell, Entity, EntityObject};
    pub use crate::sql::{CompiledQuery, Dialect};
}
