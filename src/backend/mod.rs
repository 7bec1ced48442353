//! Relational backends an aggregation runs against.
//!
//! An aggregation needs two things from a backend: executing a rendered
//! statement ([`Executor`]) and looking up entity rows by key in one round
//! trip ([`EntityResolver`]). [`SqliteBackend`] provides both.

mod sqlite;

pub use sqlite::SqliteBackend;

use std::collections::HashMap;

use crate::error::BackendError;
use crate::model::{Cell, Entity, EntityObject};
use crate::sql::CompiledQuery;

/// Executes a compiled statement and fetches every row.
pub trait Executor {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<Vec<Cell>>, BackendError>;
}

/// Batch lookup of entity rows by primary key.
///
/// Keys without a row are simply absent from the returned map; the caller
/// decides whether that is an error.
pub trait EntityResolver {
    fn resolve(
        &self,
        entity: Entity,
        keys: &[i64],
    ) -> Result<HashMap<i64, EntityObject>, BackendError>;
}

impl<T: Executor + ?Sized> Executor for &T {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<Vec<Cell>>, BackendError> {
        (**self).execute(query)
    }
}

impl<T: EntityResolver + ?Sized> EntityResolver for &T {
    fn resolve(
        &self,
        entity: Entity,
        keys: &[i64],
    ) -> Result<HashMap<i64, EntityObject>, BackendError> {
        (**self).resolve(entity, keys)
    }
}
