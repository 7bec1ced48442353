//! Entry point tying compilation, execution and materialization together.

use tracing::{debug, info, warn};

use super::category::Category;
use super::compiler::{compile_aggregate, require_values};
use super::materialize::{materialize, AggregateRows};
use super::schema::Schema;
use super::selection::CodingSelection;
use super::value::Value;
use crate::backend::{EntityResolver, Executor};
use crate::error::{AggregateError, Result};
use crate::sql::{CompiledQuery, Dialect};

/// Runs aggregations over a fixed coding selection.
///
/// ```ignore
/// let backend = SqliteBackend::open("codings.db", Schema::default())?;
/// let rows = Aggregator::new(&backend, CodingSelection::new([1, 2, 3]))
///     .with_dialect(Dialect::Sqlite)
///     .flat(true)
///     .aggregate(&[Category::medium()], &[Value::count()])?;
/// ```
pub struct Aggregator<'a, E: ?Sized, R: ?Sized> {
    executor: &'a E,
    resolver: &'a R,
    schema: Schema,
    dialect: Dialect,
    selection: CodingSelection,
    flat: bool,
}

impl<'a, B> Aggregator<'a, B, B>
where
    B: Executor + EntityResolver + ?Sized,
{
    /// Aggregate against a backend that both executes and resolves.
    pub fn new(backend: &'a B, selection: CodingSelection) -> Self {
        Self::with_parts(backend, backend, selection)
    }
}

impl<'a, E, R> Aggregator<'a, E, R>
where
    E: Executor + ?Sized,
    R: EntityResolver + ?Sized,
{
    pub fn with_parts(executor: &'a E, resolver: &'a R, selection: CodingSelection) -> Self {
        Self {
            executor,
            resolver,
            schema: Schema::default(),
            dialect: Dialect::default(),
            selection,
            flat: false,
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Unwrap singleton category and value tuples in result rows.
    pub fn flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    pub fn selection(&self) -> &CodingSelection {
        &self.selection
    }

    /// Render the statement `aggregate` would run, without executing it.
    pub fn compile(&self, categories: &[Category], values: &[Value]) -> Result<CompiledQuery> {
        compile_aggregate(
            &self.schema,
            self.dialect,
            categories,
            values,
            &self.selection,
        )
    }

    /// Execute one aggregation and return its rows.
    ///
    /// An empty selection yields no rows without touching the backend.
    pub fn aggregate(&self, categories: &[Category], values: &[Value]) -> Result<AggregateRows> {
        require_values(values)?;
        if self.selection.is_empty() {
            debug!("empty coding selection, skipping query");
            return Ok(AggregateRows::empty());
        }

        let query = self.compile(categories, values)?;
        debug!(
            dialect = %self.dialect,
            params = query.params.len(),
            sql = %query.sql,
            "executing aggregation"
        );

        let rows = self.executor.execute(&query).map_err(|source| {
            warn!(error = %source, "aggregation query failed");
            AggregateError::QueryExecution {
                sql: query.sql.clone(),
                source,
            }
        })?;
        info!(
            rows = rows.len(),
            categories = categories.len(),
            values = values.len(),
            "aggregation complete"
        );

        materialize(self.resolver, rows, categories, values.len(), self.flat)
    }
}
