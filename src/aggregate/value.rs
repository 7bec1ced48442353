//! Aggregate measures: distinct article counts and coded field averages.

use std::str::FromStr;

use uuid::Uuid;

use super::fragment::Fragment;
use super::schema::{alias, column, Schema};
use crate::error::{AggregateError, Result};
use crate::sql::{avg, count_distinct, param_int, table_col, Expr, ExprExt, Join, TableRef};

/// Namespace token owned by one value instance.
///
/// Any table a value joins in is aliased with its token, so two values in the
/// same statement never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alias(String);

impl Alias {
    /// A fresh random token.
    pub fn generate() -> Self {
        Alias(Uuid::new_v4().simple().to_string())
    }

    /// Fails with `InvalidArgument` unless `token` is non-empty ASCII alphanumeric.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AggregateError::InvalidArgument(format!(
                "alias token must be non-empty and alphanumeric: {token:?}"
            )));
        }
        Ok(Alias(token))
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Table alias for `base` inside this namespace, e.g. `T<token>_codings_values`.
    pub fn table_alias(&self, base: &str) -> String {
        format!("T{}_{}", self.0, base)
    }
}

// =============================================================================
// Value variants
// =============================================================================

/// Counts distinct articles in each group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountValue {
    alias: Alias,
}

impl CountValue {
    pub fn new() -> Self {
        Self {
            alias: Alias::generate(),
        }
    }

    pub fn alias(&self) -> &Alias {
        &self.alias
    }
}

impl Default for CountValue {
    fn default() -> Self {
        Self::new()
    }
}

impl Fragment for CountValue {
    fn select(&self) -> Expr {
        count_distinct(table_col(alias::ARTICLES, column::ARTICLE_ID))
    }
}

/// Averages the integer value coded for one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AverageValue {
    field_id: i64,
    alias: Alias,
}

impl AverageValue {
    pub fn new(field_id: i64) -> Self {
        Self::with_alias(field_id, Alias::generate())
    }

    pub fn with_alias(field_id: i64, alias: Alias) -> Self {
        Self { field_id, alias }
    }

    pub fn field_id(&self) -> i64 {
        self.field_id
    }

    pub fn alias(&self) -> &Alias {
        &self.alias
    }

    fn values_alias(&self) -> String {
        self.alias.table_alias("codings_values")
    }
}

impl Fragment for AverageValue {
    fn select(&self) -> Expr {
        avg(table_col(&self.values_alias(), column::INTVAL))
    }

    fn joins(&self, schema: &Schema) -> Vec<Join> {
        let values_alias = self.values_alias();
        vec![Join::inner(
            TableRef::new(&schema.coding_values).with_alias(&values_alias),
            table_col(alias::CODINGS, column::CODING_ID)
                .eq(table_col(&values_alias, column::CODING_ID)),
        )]
    }

    fn wheres(&self) -> Vec<Expr> {
        vec![table_col(&self.values_alias(), column::FIELD_ID).eq(param_int(self.field_id))]
    }
}

// =============================================================================
// Value
// =============================================================================

/// One measure of an aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Count(CountValue),
    Average(AverageValue),
}

impl Value {
    pub fn count() -> Self {
        Value::Count(CountValue::new())
    }

    pub fn average(field_id: i64) -> Self {
        Value::Average(AverageValue::new(field_id))
    }

    pub fn alias(&self) -> &Alias {
        match self {
            Value::Count(v) => v.alias(),
            Value::Average(v) => v.alias(),
        }
    }

    fn fragment(&self) -> &dyn Fragment {
        match self {
            Value::Count(v) => v,
            Value::Average(v) => v,
        }
    }
}

impl Fragment for Value {
    fn select(&self) -> Expr {
        self.fragment().select()
    }

    fn joins(&self, schema: &Schema) -> Vec<Join> {
        self.fragment().joins(schema)
    }

    fn wheres(&self) -> Vec<Expr> {
        self.fragment().wheres()
    }
}

impl FromStr for Value {
    type Err = AggregateError;

    /// Parses `count` or `avg:<field id>`.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            None if s == "count" => Ok(Value::count()),
            Some(("avg" | "average", id)) => id
                .parse()
                .map(Value::average)
                .map_err(|_| AggregateError::InvalidArgument(format!("invalid field id: {id}"))),
            _ => Err(AggregateError::InvalidArgument(format!(
                "unknown value: {s}. Expected count or avg:<field id>"
            ))),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Count(_) => write!(f, "count"),
            Value::Average(v) => write!(f, "avg:{}", v.field_id()),
        }
    }
}
