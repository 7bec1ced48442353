//! Composable pieces of an aggregation statement.

use super::schema::Schema;
use crate::sql::{Expr, Join};

/// A unit contributing a select expression plus optional joins, filters and
/// grouping to one aggregation statement.
///
/// Implementations are pure: every method is a function of the fragment's
/// own fields. Joins may only reference the base chain aliases or an alias
/// the fragment introduces itself.
pub trait Fragment {
    fn select(&self) -> Expr;

    fn joins(&self, _schema: &Schema) -> Vec<Join> {
        Vec::new()
    }

    fn wheres(&self) -> Vec<Expr> {
        Vec::new()
    }

    /// Categories group by exactly their select expression; values return `None`.
    fn group_by(&self) -> Option<Expr> {
        None
    }
}
