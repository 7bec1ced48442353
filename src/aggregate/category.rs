//! Grouping dimensions: time buckets, entity foreign keys and coded field values.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::fragment::Fragment;
use super::schema::{alias, column, Schema};
use crate::error::{AggregateError, Result};
use crate::model::Entity;
use crate::sql::{func, lit_str, param_int, table_col, Expr, ExprExt, Join};

// =============================================================================
// Granularity
// =============================================================================

/// Truncation granularities accepted by `date_trunc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Microseconds,
    Milliseconds,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    Decade,
    Century,
    Millennium,
}

impl Granularity {
    pub const ALL: [Granularity; 13] = [
        Granularity::Microseconds,
        Granularity::Milliseconds,
        Granularity::Second,
        Granularity::Minute,
        Granularity::Hour,
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
        Granularity::Decade,
        Granularity::Century,
        Granularity::Millennium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Microseconds => "microseconds",
            Granularity::Milliseconds => "milliseconds",
            Granularity::Second => "second",
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
            Granularity::Decade => "decade",
            Granularity::Century => "century",
            Granularity::Millennium => "millennium",
        }
    }

    /// Truncate `ts` the way PostgreSQL's `date_trunc` does.
    ///
    /// Weeks start on Monday. Centuries and millennia start at years ending
    /// in 01 (2001-01-01 is the first day of the 21st century).
    pub fn truncate(&self, ts: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = ts.date();
        let midnight = |d: NaiveDate| d.and_time(NaiveTime::MIN);
        let first_of_year = |year: i32| NaiveDate::from_ymd_opt(year, 1, 1).map(midnight);

        match self {
            Granularity::Microseconds => ts.with_nanosecond(ts.nanosecond() / 1_000 * 1_000),
            Granularity::Milliseconds => {
                ts.with_nanosecond(ts.nanosecond() / 1_000_000 * 1_000_000)
            }
            Granularity::Second => ts.with_nanosecond(0),
            Granularity::Minute => ts.with_nanosecond(0)?.with_second(0),
            Granularity::Hour => ts.with_nanosecond(0)?.with_second(0)?.with_minute(0),
            Granularity::Day => Some(midnight(date)),
            Granularity::Week => date
                .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
                .map(midnight),
            Granularity::Month => date.with_day(1).map(midnight),
            Granularity::Quarter => {
                NaiveDate::from_ymd_opt(date.year(), date.month0() / 3 * 3 + 1, 1).map(midnight)
            }
            Granularity::Year => first_of_year(date.year()),
            Granularity::Decade => first_of_year(date.year() - date.year().rem_euclid(10)),
            Granularity::Century => first_of_year((date.year() - 1).div_euclid(100) * 100 + 1),
            Granularity::Millennium => {
                first_of_year((date.year() - 1).div_euclid(1000) * 1000 + 1)
            }
        }
    }
}

impl FromStr for Granularity {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self> {
        Granularity::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| {
                let choices: Vec<_> = Granularity::ALL.iter().map(|g| g.as_str()).collect();
                AggregateError::InvalidArgument(format!(
                    "{s} is not a valid interval. Choose one of: {}",
                    choices.join(", ")
                ))
            })
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Category variants
// =============================================================================

/// Buckets the article date by a truncation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalCategory {
    granularity: Granularity,
}

impl IntervalCategory {
    /// Fails with `InvalidArgument` unless `interval` names a [`Granularity`].
    pub fn new(interval: &str) -> Result<Self> {
        Ok(Self {
            granularity: interval.parse()?,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}

impl From<Granularity> for IntervalCategory {
    fn from(granularity: Granularity) -> Self {
        Self { granularity }
    }
}

impl Fragment for IntervalCategory {
    fn select(&self) -> Expr {
        func(
            "date_trunc",
            vec![
                lit_str(self.granularity.as_str()),
                table_col(alias::ARTICLES, column::DATE),
            ],
        )
    }

    fn group_by(&self) -> Option<Expr> {
        Some(self.select())
    }
}

/// Groups by an article foreign key, resolved to entity objects afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCategory {
    entity: Entity,
}

impl EntityCategory {
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }
}

impl Fragment for EntityCategory {
    fn select(&self) -> Expr {
        table_col(alias::ARTICLES, self.entity.key_column())
    }

    fn group_by(&self) -> Option<Expr> {
        Some(self.select())
    }
}

/// Groups by the integer value coded for one schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodedFieldCategory {
    field_id: i64,
}

impl CodedFieldCategory {
    pub fn new(field_id: i64) -> Self {
        Self { field_id }
    }

    pub fn field_id(&self) -> i64 {
        self.field_id
    }
}

impl Fragment for CodedFieldCategory {
    fn select(&self) -> Expr {
        table_col(alias::CODING_VALUES, column::INTVAL)
    }

    fn wheres(&self) -> Vec<Expr> {
        vec![table_col(alias::CODING_VALUES, column::FIELD_ID).eq(param_int(self.field_id))]
    }

    fn group_by(&self) -> Option<Expr> {
        Some(self.select())
    }
}

// =============================================================================
// Category
// =============================================================================

/// One grouping dimension of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Interval(IntervalCategory),
    Entity(EntityCategory),
    CodedField(CodedFieldCategory),
}

impl Category {
    pub fn interval(interval: &str) -> Result<Self> {
        IntervalCategory::new(interval).map(Category::Interval)
    }

    pub fn entity(entity: Entity) -> Self {
        Category::Entity(EntityCategory::new(entity))
    }

    pub fn medium() -> Self {
        Self::entity(Entity::Medium)
    }

    pub fn coded_field(field_id: i64) -> Self {
        Category::CodedField(CodedFieldCategory::new(field_id))
    }

    /// Entity type raw values at this position resolve to, if any.
    pub fn entity_type(&self) -> Option<Entity> {
        match self {
            Category::Entity(c) => Some(c.entity()),
            _ => None,
        }
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, Category::Interval(_))
    }

    fn fragment(&self) -> &dyn Fragment {
        match self {
            Category::Interval(c) => c,
            Category::Entity(c) => c,
            Category::CodedField(c) => c,
        }
    }
}

impl Fragment for Category {
    fn select(&self) -> Expr {
        self.fragment().select()
    }

    fn joins(&self, schema: &Schema) -> Vec<Join> {
        self.fragment().joins(schema)
    }

    fn wheres(&self) -> Vec<Expr> {
        self.fragment().wheres()
    }

    fn group_by(&self) -> Option<Expr> {
        self.fragment().group_by()
    }
}

impl FromStr for Category {
    type Err = AggregateError;

    /// Parses `interval:<granularity>`, `medium` or `field:<id>`.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some(("interval", granularity)) => Category::interval(granularity),
            Some(("field", id)) => id
                .parse()
                .map(Category::coded_field)
                .map_err(|_| AggregateError::InvalidArgument(format!("invalid field id: {id}"))),
            None if s == Entity::Medium.name() => Ok(Category::medium()),
            _ => Err(AggregateError::InvalidArgument(format!(
                "unknown category: {s}. Expected interval:<granularity>, medium or field:<id>"
            ))),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Interval(c) => write!(f, "interval:{}", c.granularity()),
            Category::Entity(c) => write!(f, "{}", c.entity()),
            Category::CodedField(c) => write!(f, "field:{}", c.field_id()),
        }
    }
}
