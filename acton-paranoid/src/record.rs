//! Dynamic records
//!
//! A [`Record`] is one row of one record type: its type name, the name of its
//! primary key column and a map of column values. The engine never needs to
//! know a concrete Rust type for a row, which is what lets it walk arbitrary
//! association graphs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::Value;

static NULL: Value = Value::Null;

/// One persisted (or about to be persisted) row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    type_name: String,
    primary_key: String,
    fields: BTreeMap<String, Value>,
    new_record: bool,
    #[serde(skip)]
    frozen: bool,
    #[serde(skip)]
    removed: bool,
}

impl Record {
    /// Create an empty, not yet persisted record
    pub fn new(type_name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            primary_key: primary_key.into(),
            fields: BTreeMap::new(),
            new_record: true,
            frozen: false,
            removed: false,
        }
    }

    /// Build a record from a JSON object
    ///
    /// Non-object JSON yields a record without fields.
    ///
    /// ```rust
    /// use acton_paranoid::{Record, Value};
    ///
    /// let post = Record::from_json("Post", "id", serde_json::json!({"id": 1, "title": "hi"}));
    /// assert_eq!(post.get("title"), &Value::from("hi"));
    /// ```
    pub fn from_json(
        type_name: impl Into<String>,
        primary_key: impl Into<String>,
        json: serde_json::Value,
    ) -> Self {
        let mut record = Self::new(type_name, primary_key);
        if let serde_json::Value::Object(map) = json {
            for (column, value) in map {
                record.fields.insert(column, Value::from(value));
            }
        }
        record
    }

    /// Builder-style field assignment
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Name of the record's type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Name of the primary key column
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// The record's identifier, NULL when unset
    pub fn id(&self) -> &Value {
        self.get(&self.primary_key)
    }

    /// Read a column; absent columns read as NULL
    pub fn get(&self, column: &str) -> &Value {
        self.fields.get(column).unwrap_or(&NULL)
    }

    /// Write a column
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(column.into(), value.into());
    }

    /// All columns, ordered by name
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Whether the record has never been saved
    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    /// Flag the record as stored; called by backends on insert and load
    pub fn mark_persisted(&mut self) {
        self.new_record = false;
    }

    /// Whether the record is frozen and must not be written again
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze the record
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the row was physically removed
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Mark the row as physically removed and freeze the in-memory copy
    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
        self.frozen = true;
    }
}
