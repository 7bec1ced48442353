//! The set of codings an aggregation is restricted to.

use std::collections::BTreeSet;

use tracing::debug;

use super::compiler::selection_query;
use super::schema::Schema;
use crate::backend::Executor;
use crate::error::{AggregateError, BackendError, Result};
use crate::model::Cell;
use crate::sql::Dialect;

/// Immutable, de-duplicated set of coding primary keys in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodingSelection {
    ids: Vec<i64>,
}

impl CodingSelection {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        let ids: BTreeSet<i64> = ids.into_iter().collect();
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Codings whose coded article belongs to one of `article_ids` and one
    /// of `job_ids`.
    ///
    /// Returns an empty selection without touching the backend when either
    /// list is empty.
    pub fn from_articles<E: Executor + ?Sized>(
        executor: &E,
        schema: &Schema,
        dialect: Dialect,
        article_ids: &[i64],
        job_ids: &[i64],
    ) -> Result<Self> {
        if article_ids.is_empty() || job_ids.is_empty() {
            return Ok(Self::default());
        }

        let query = selection_query(schema, article_ids, job_ids).compile(dialect);
        debug!(
            articles = article_ids.len(),
            jobs = job_ids.len(),
            "selecting codings"
        );

        let rows = executor
            .execute(&query)
            .map_err(|source| AggregateError::QueryExecution {
                sql: query.sql.clone(),
                source,
            })?;

        let ids = rows
            .into_iter()
            .map(|row| match row.first() {
                Some(Cell::Int(id)) => Ok(*id),
                other => Err(AggregateError::QueryExecution {
                    sql: query.sql.clone(),
                    source: BackendError::Decode(format!("expected coding id, got {other:?}")),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(ids))
    }
}

impl FromIterator<i64> for CodingSelection {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self::new(iter)
    }
}
