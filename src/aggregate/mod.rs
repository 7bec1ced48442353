//! Dynamic aggregation over codings.
//!
//! A request is a list of [`Category`] fragments (what to group by) and a
//! list of [`Value`] fragments (what to measure). The compiler folds them
//! into one statement over the coding tables, and the materializer reshapes
//! the fetched rows into `(categories, values)` pairs.

mod category;
mod compiler;
mod engine;
mod fragment;
mod materialize;
mod schema;
mod selection;
mod value;

pub use category::{Category, CodedFieldCategory, EntityCategory, Granularity, IntervalCategory};
pub use compiler::{build_aggregate_query, compile_aggregate, selection_query};
pub use engine::Aggregator;
pub use fragment::Fragment;
pub use materialize::{materialize, AggregateRow, AggregateRows, RowPart};
pub use schema::{alias, column, Schema};
pub use selection::CodingSelection;
pub use value::{Alias, AverageValue, CountValue, Value};
