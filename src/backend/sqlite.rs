//! SQLite backend built on rusqlite.
//!
//! SQLite has no `date_trunc`, so one with PostgreSQL semantics is
//! registered on every connection this backend opens. Timestamps are
//! stored and returned as text.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use tracing::debug;

use super::{EntityResolver, Executor};
use crate::aggregate::{Granularity, Schema};
use crate::error::{AggregateError, BackendError};
use crate::model::{format_timestamp, parse_timestamp, Cell, Entity, EntityObject};
use crate::sql::{col, CompiledQuery, Dialect, ExprExt, Literal, Query, SqlDialect, TableRef};

/// An aggregation backend over one SQLite connection.
pub struct SqliteBackend {
    conn: Connection,
    schema: Schema,
}

impl SqliteBackend {
    /// Open or create a database file.
    pub fn open<P: AsRef<Path>>(path: P, schema: Schema) -> Result<Self, BackendError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, schema)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory(schema: Schema) -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, schema)
    }

    /// Wrap an existing connection, registering `date_trunc` on it.
    pub fn from_connection(conn: Connection, schema: Schema) -> Result<Self, BackendError> {
        register_date_trunc(&conn)?;
        Ok(Self { conn, schema })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Create the coding tables if they don't exist.
    pub fn create_schema(&self) -> Result<(), BackendError> {
        let q = |name: &str| Dialect::Sqlite.quote_identifier(name);
        let s = &self.schema;
        self.conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {media} (
                medium_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {articles} (
                article_id INTEGER PRIMARY KEY,
                date TEXT NOT NULL,
                medium_id INTEGER REFERENCES {media} (medium_id)
            );

            CREATE TABLE IF NOT EXISTS {coded_articles} (
                id INTEGER PRIMARY KEY,
                article_id INTEGER NOT NULL REFERENCES {articles} (article_id),
                codingjob_id INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {codings} (
                coding_id INTEGER PRIMARY KEY,
                coded_article_id INTEGER NOT NULL REFERENCES {coded_articles} (id)
            );

            CREATE TABLE IF NOT EXISTS {coding_values} (
                codingvalue_id INTEGER PRIMARY KEY,
                coding_id INTEGER NOT NULL REFERENCES {codings} (coding_id),
                field_id INTEGER NOT NULL,
                intval INTEGER
            );
            ",
            media = q(&s.media),
            articles = q(&s.articles),
            coded_articles = q(&s.coded_articles),
            codings = q(&s.codings),
            coding_values = q(&s.coding_values),
        ))?;
        Ok(())
    }
}

impl Executor for SqliteBackend {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<Vec<Cell>>, BackendError> {
        // The statement is finalized when it goes out of scope, on error too.
        let mut stmt = self.conn.prepare(&query.sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(query.params.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let cells = (0..width)
                .map(|i| row.get_ref(i).map_err(BackendError::from).and_then(cell_from_sql))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(cells);
        }
        Ok(out)
    }
}

impl EntityResolver for SqliteBackend {
    fn resolve(
        &self,
        entity: Entity,
        keys: &[i64],
    ) -> Result<HashMap<i64, EntityObject>, BackendError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let query = Query::new()
            .select(vec![col(entity.key_column()), col(entity.label_column())])
            .from(TableRef::new(self.schema.entity_table(entity)))
            .filter(col(entity.key_column()).in_ids(keys))
            .compile(Dialect::Sqlite);
        debug!(%entity, keys = keys.len(), "resolving entities");

        self.execute(&query)?
            .into_iter()
            .map(|row| match row.as_slice() {
                [Cell::Int(id), Cell::Text(name)] => {
                    Ok((*id, EntityObject::new(entity, *id, name.clone())))
                }
                other => Err(BackendError::Decode(format!(
                    "unexpected {entity} row: {other:?}"
                ))),
            })
            .collect()
    }
}

/// Id lists travel as one JSON array text, expanded by `json_each`.
impl ToSql for Literal {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Literal::Int(n) => ToSqlOutput::Owned(SqlValue::Integer(*n)),
            Literal::IntList(ids) => {
                let json = serde_json::to_string(ids)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                ToSqlOutput::Owned(SqlValue::Text(json))
            }
        })
    }
}

fn cell_from_sql(value: ValueRef<'_>) -> Result<Cell, BackendError> {
    match value {
        ValueRef::Null => Ok(Cell::Null),
        ValueRef::Integer(n) => Ok(Cell::Int(n)),
        ValueRef::Real(f) => Ok(Cell::Float(f)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Cell::Text(s.to_string()))
            .map_err(|e| BackendError::Decode(format!("invalid UTF-8 text: {e}"))),
        ValueRef::Blob(_) => Err(BackendError::Decode("blob columns are not supported".into())),
    }
}

/// Register `date_trunc(granularity, timestamp)` on `conn`.
///
/// NULL timestamps truncate to NULL. Unknown granularities and unparsable
/// timestamps raise an SQL error.
fn register_date_trunc(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "date_trunc",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let granularity: String = ctx.get(0)?;
            let granularity: Granularity = granularity
                .parse()
                .map_err(|e: AggregateError| {
                    rusqlite::Error::UserFunctionError(e.to_string().into())
                })?;

            let Some(raw) = ctx.get::<Option<String>>(1)? else {
                return Ok(None);
            };
            let truncated = parse_timestamp(&raw)
                .and_then(|ts| granularity.truncate(ts))
                .ok_or_else(|| {
                    rusqlite::Error::UserFunctionError(
                        format!("cannot truncate {raw:?} to {granularity}").into(),
                    )
                })?;
            Ok(Some(format_timestamp(truncated)))
        },
    )
}
