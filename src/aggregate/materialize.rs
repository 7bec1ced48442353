//! Turns raw result rows into category/value pairs.
//!
//! Entity resolution runs as a separate pass over the fully fetched row set,
//! one batch lookup per entity-backed category column.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use super::category::Category;
use crate::backend::EntityResolver;
use crate::error::{AggregateError, Result};
use crate::model::{parse_timestamp, Cell, Entity, EntityObject};

/// One side of a result row: either the full tuple or, when flattened, the
/// single cell it contained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowPart {
    Tuple(Vec<Cell>),
    Single(Cell),
}

impl RowPart {
    /// The cells in this part, in request order.
    pub fn cells(&self) -> &[Cell] {
        match self {
            RowPart::Tuple(cells) => cells,
            RowPart::Single(cell) => std::slice::from_ref(cell),
        }
    }

    pub fn as_single(&self) -> Option<&Cell> {
        match self {
            RowPart::Single(cell) => Some(cell),
            RowPart::Tuple(_) => None,
        }
    }

    fn from_cells(mut cells: Vec<Cell>, flatten: bool) -> Self {
        if flatten && cells.len() == 1 {
            if let Some(cell) = cells.pop() {
                return RowPart::Single(cell);
            }
        }
        RowPart::Tuple(cells)
    }
}

/// A `(categories, values)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub categories: RowPart,
    pub values: RowPart,
}

/// Result rows of one aggregation, consumed in a single pass.
#[derive(Debug)]
pub struct AggregateRows {
    rows: std::vec::IntoIter<Vec<Cell>>,
    category_count: usize,
    flat_categories: bool,
    flat_values: bool,
}

impl AggregateRows {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new().into_iter(),
            category_count: 0,
            flat_categories: false,
            flat_values: false,
        }
    }
}

impl Iterator for AggregateRows {
    type Item = AggregateRow;

    fn next(&mut self) -> Option<AggregateRow> {
        let mut categories = self.rows.next()?;
        let values = categories.split_off(self.category_count);
        Some(AggregateRow {
            categories: RowPart::from_cells(categories, self.flat_categories),
            values: RowPart::from_cells(values, self.flat_values),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for AggregateRows {}

/// Resolve entity keys in `rows` and shape them for iteration.
///
/// Every row must hold `categories.len() + value_count` cells. Interval
/// columns that come back as text are parsed into timestamps; entity columns
/// are replaced by their resolved objects, failing with `Integrity` when a
/// referenced key has no row.
pub fn materialize<R: EntityResolver + ?Sized>(
    resolver: &R,
    mut rows: Vec<Vec<Cell>>,
    categories: &[Category],
    value_count: usize,
    flat: bool,
) -> Result<AggregateRows> {
    let width = categories.len() + value_count;
    if let Some(row) = rows.iter().find(|row| row.len() != width) {
        return Err(AggregateError::Decode(format!(
            "expected {width} columns per row, got {}",
            row.len()
        )));
    }

    for (position, category) in categories.iter().enumerate() {
        if category.is_interval() {
            coerce_timestamps(&mut rows, position);
        } else if let Some(entity) = category.entity_type() {
            resolve_column(resolver, &mut rows, position, entity)?;
        }
    }

    Ok(AggregateRows {
        rows: rows.into_iter(),
        category_count: categories.len(),
        flat_categories: flat && categories.len() == 1,
        flat_values: flat && value_count == 1,
    })
}

fn coerce_timestamps(rows: &mut [Vec<Cell>], position: usize) {
    for row in rows.iter_mut() {
        let cell = &mut row[position];
        let Cell::Text(text) = cell else {
            continue;
        };
        match parse_timestamp(text) {
            Some(ts) => *cell = Cell::Timestamp(ts),
            None => warn!(value = %text, "interval value is not a timestamp"),
        }
    }
}

fn resolve_column<R: EntityResolver + ?Sized>(
    resolver: &R,
    rows: &mut [Vec<Cell>],
    position: usize,
    entity: Entity,
) -> Result<()> {
    let keys = rows
        .iter()
        .filter_map(|row| match &row[position] {
            Cell::Null => None,
            cell => Some(entity_key(entity, cell)),
        })
        .collect::<Result<BTreeSet<i64>>>()?;
    if keys.is_empty() {
        return Ok(());
    }

    let keys: Vec<i64> = keys.into_iter().collect();
    debug!(%entity, keys = keys.len(), "resolving category column");
    let objects: HashMap<i64, EntityObject> = resolver
        .resolve(entity, &keys)
        .map_err(|source| AggregateError::Resolution { entity, source })?;

    for row in rows.iter_mut() {
        let cell = &mut row[position];
        if cell.is_null() {
            continue;
        }
        let key = entity_key(entity, cell)?;
        let object = objects
            .get(&key)
            .ok_or(AggregateError::Integrity { entity, key })?;
        *cell = Cell::Entity(object.clone());
    }
    Ok(())
}

fn entity_key(entity: Entity, cell: &Cell) -> Result<i64> {
    match cell {
        Cell::Int(key) => Ok(*key),
        other => Err(AggregateError::Decode(format!(
            "{entity} key must be an integer, got {other:?}"
        ))),
    }
}
