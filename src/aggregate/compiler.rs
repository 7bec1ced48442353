//! Assembles fragments into one aggregation statement.
//!
//! The statement always has the shape
//!
//! ```text
//! SELECT <category selects>, <value selects>
//! FROM coding values
//! <base join chain> <value joins>
//! WHERE (<coding id IN selection>) AND (<fragment wheres>) ...
//! [GROUP BY <category selects>]
//! ```
//!
//! GROUP BY is omitted when there are no categories, producing a single row.

use super::category::Category;
use super::fragment::Fragment;
use super::schema::{alias, column, Schema};
use super::selection::CodingSelection;
use super::value::Value;
use crate::error::{AggregateError, Result};
use crate::sql::{table_col, CompiledQuery, Dialect, ExprExt, Query, TableRef};

/// Reject a request without values; an aggregation needs at least one column
/// to compute.
pub(super) fn require_values(values: &[Value]) -> Result<()> {
    if values.is_empty() {
        return Err(AggregateError::Configuration(
            "You must specify at least one value.".to_string(),
        ));
    }
    Ok(())
}

/// Build the aggregation statement for `categories` and `values` over `selection`.
///
/// Fails with `Configuration` when `values` is empty and with
/// `EmptySelection` when there is nothing to restrict to.
pub fn build_aggregate_query(
    schema: &Schema,
    categories: &[Category],
    values: &[Value],
    selection: &CodingSelection,
) -> Result<Query> {
    require_values(values)?;
    if selection.is_empty() {
        return Err(AggregateError::EmptySelection);
    }

    let mut selects = Vec::with_capacity(categories.len() + values.len());
    let mut groups = Vec::with_capacity(categories.len());
    let mut joins = schema.base_joins();
    let mut wheres =
        vec![table_col(alias::CODING_VALUES, column::CODING_ID).in_ids(selection.ids())];

    let fragments = categories
        .iter()
        .map(|c| c as &dyn Fragment)
        .chain(values.iter().map(|v| v as &dyn Fragment));

    for fragment in fragments {
        selects.push(fragment.select());
        groups.extend(fragment.group_by());
        joins.extend(fragment.joins(schema));
        wheres.extend(fragment.wheres());
    }

    let mut query = Query::new()
        .select(selects)
        .from(schema.base_table())
        .joins(joins)
        .group_by(groups);

    if let Some(condition) = wheres
        .into_iter()
        .map(|w| w.paren())
        .reduce(|acc, w| acc.and(w))
    {
        query = query.filter(condition);
    }

    Ok(query)
}

/// Render the aggregation statement for `dialect`.
pub fn compile_aggregate(
    schema: &Schema,
    dialect: Dialect,
    categories: &[Category],
    values: &[Value],
    selection: &CodingSelection,
) -> Result<CompiledQuery> {
    build_aggregate_query(schema, categories, values, selection).map(|q| q.compile(dialect))
}

/// Coding ids whose coded article is in `article_ids` and whose job is in `job_ids`.
pub fn selection_query(schema: &Schema, article_ids: &[i64], job_ids: &[i64]) -> Query {
    Query::new()
        .select(vec![table_col(alias::CODINGS, column::CODING_ID)])
        .from(TableRef::new(&schema.codings).with_alias(alias::CODINGS))
        .inner_join(
            TableRef::new(&schema.coded_articles).with_alias(alias::CODED_ARTICLES),
            table_col(alias::CODINGS, column::CODED_ARTICLE_ID)
                .eq(table_col(alias::CODED_ARTICLES, column::ID)),
        )
        .filter(
            table_col(alias::CODED_ARTICLES, column::ARTICLE_ID)
                .in_ids(article_ids)
                .paren(),
        )
        .filter(
            table_col(alias::CODED_ARTICLES, column::CODINGJOB_ID)
                .in_ids(job_ids)
                .paren(),
        )
}
