//! Column values and filter predicates
//!
//! Every lookup the cascade engine performs is expressed as a [`Filter`]: a
//! conjunction of [`FilterCondition`]s over a single record type. Backends
//! translate filters into their own query language; [`FilterCondition::matches`]
//! evaluates them directly against a [`Record`] for in-memory stores.
//!
//! # Example
//!
//! ```rust
//! use acton_paranoid::filter::{Filter, FilterCondition};
//!
//! let filter = Filter::new()
//!     .and_condition(FilterCondition::eq("post_id", 7_i64))
//!     .and_condition(FilterCondition::is_null("deleted_at"));
//! assert_eq!(filter.conditions().len(), 2);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::Record;

/// A dynamically typed column value
///
/// `Null` is the only value for which [`Value::is_null`] holds, so a missing
/// or null deletion marker both read as "not deleted". Serialized externally
/// tagged so strings that look like UUIDs or timestamps keep their variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Timestamp value, used by deletion markers
    Timestamp(DateTime<Utc>),
    /// UUID value
    Uuid(Uuid),
    /// String value
    String(String),
}

impl Value {
    /// Whether this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Timestamp(at) => write!(f, "{}", at.to_rfc3339()),
            Self::Uuid(id) => write!(f, "{}", id),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Timestamp(at)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Self::Null,
            J::Bool(b) => Self::Boolean(b),
            J::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .unwrap_or_else(|| Self::Float(n.as_f64().unwrap_or_default())),
            J::String(s) => Self::String(s),
            other => Self::String(other.to_string()),
        }
    }
}

/// Comparison operators for filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Value is null (IS NULL)
    IsNull,
    /// Value is not null (IS NOT NULL)
    IsNotNull,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::IsNull => write!(f, "IS NULL"),
            Self::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// A single predicate over one column
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// The column name to filter on
    pub field: String,
    /// The comparison operator
    pub operator: FilterOperator,
    /// The value to compare against
    pub value: Value,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter (field = value)
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Equal, value.into())
    }

    /// Create an IS NULL filter
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paranoid::filter::{FilterCondition, FilterOperator};
    ///
    /// let filter = FilterCondition::is_null("deleted_at");
    /// assert_eq!(filter.operator, FilterOperator::IsNull);
    /// ```
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, Value::Null)
    }

    /// Create an IS NOT NULL filter
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNotNull, Value::Null)
    }

    /// Evaluate this condition against a record
    ///
    /// A field the record does not carry reads as NULL. Comparisons against
    /// NULL never match, as in SQL.
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field);
        match self.operator {
            FilterOperator::IsNull => actual.is_null(),
            FilterOperator::IsNotNull => !actual.is_null(),
            FilterOperator::Equal => !actual.is_null() && *actual == self.value,
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            FilterOperator::IsNull | FilterOperator::IsNotNull => {
                write!(f, "{} {}", self.field, self.operator)
            }
            FilterOperator::Equal => write!(f, "{} {} {}", self.field, self.operator, self.value),
        }
    }
}

/// A conjunction of filter conditions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    conditions: Vec<FilterCondition>,
}

impl Filter {
    /// An empty filter, matching every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition
    #[must_use]
    pub fn and_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an equality condition
    #[must_use]
    pub fn and_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_condition(FilterCondition::eq(field, value))
    }

    /// Combine with every condition of another filter
    #[must_use]
    pub fn and(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    /// The conditions of this filter, in insertion order
    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Whether the filter has no conditions
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether every condition matches the record
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

impl From<FilterCondition> for Filter {
    fn from(condition: FilterCondition) -> Self {
        Self::new().and_condition(condition)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "TRUE");
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{}", condition)?;
        }
        Ok(())
    }
}
