//! In-memory store
//!
//! Tables are vectors of records keyed by type name. Transactions snapshot
//! the tables and restore them when the closure fails. Every select is logged
//! so callers can assert which lookups an operation performed.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::{DataStore, HardDeletable, StoreError, StoreOperation, StoreResult};
use crate::filter::{Filter, Value};
use crate::record::Record;

/// One logged select
#[derive(Debug, Clone, PartialEq)]
pub struct SelectLog {
    /// Queried record type
    pub type_name: String,
    /// Filter applied
    pub filter: Filter,
}

/// Reference [`DataStore`] keeping rows in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Record>>,
    next_ids: HashMap<String, i64>,
    failing_updates: HashSet<String>,
    selects: RefCell<Vec<SelectLog>>,
    depth: usize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every column write to `type_name` fail
    ///
    /// Used to exercise rollback paths.
    pub fn fail_updates_for(&mut self, type_name: impl Into<String>) {
        self.failing_updates.insert(type_name.into());
    }

    /// Selects performed so far
    pub fn selects(&self) -> Vec<SelectLog> {
        self.selects.borrow().clone()
    }

    /// Forget logged selects
    pub fn clear_selects(&self) {
        self.selects.borrow_mut().clear();
    }

    /// Number of stored rows of `type_name`, deleted or not
    pub fn row_count(&self, type_name: &str) -> usize {
        self.tables.get(type_name).map_or(0, Vec::len)
    }

    /// Current stored copy of a record, bypassing every filter
    pub fn reload(&self, record: &Record) -> Option<Record> {
        self.tables
            .get(record.type_name())?
            .iter()
            .find(|row| row.id() == record.id())
            .cloned()
    }

    /// Whether a transaction is open
    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    fn row_mut(&mut self, record: &Record, operation: StoreOperation) -> StoreResult<&mut Record> {
        self.tables
            .get_mut(record.type_name())
            .and_then(|rows| rows.iter_mut().find(|row| row.id() == record.id()))
            .ok_or_else(|| {
                StoreError::not_found(record.type_name(), record.id().to_string())
                    .with_operation(operation)
            })
    }
}

impl HardDeletable for MemoryStore {
    fn delete_row(&mut self, record: &Record) -> StoreResult<bool> {
        let Some(rows) = self.tables.get_mut(record.type_name()) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| row.id() != record.id());
        Ok(rows.len() < before)
    }
}

impl DataStore for MemoryStore {
    fn insert(&mut self, record: &mut Record) -> StoreResult<()> {
        let type_name = record.type_name().to_string();
        let next_id = self.next_ids.entry(type_name.clone()).or_insert(1);

        if record.id().is_null() {
            let primary_key = record.primary_key().to_string();
            record.set(primary_key, *next_id);
            *next_id += 1;
        } else if let Value::Integer(id) = record.id() {
            *next_id = (*next_id).max(id + 1);
        }

        let rows = self.tables.entry(type_name.clone()).or_default();
        if rows.iter().any(|row| row.id() == record.id()) {
            return Err(StoreError::already_exists(type_name, record.id().to_string()));
        }

        record.mark_persisted();
        rows.push(record.clone());
        Ok(())
    }

    fn select(&self, type_name: &str, filter: &Filter) -> StoreResult<Vec<Record>> {
        self.selects.borrow_mut().push(SelectLog {
            type_name: type_name.to_string(),
            filter: filter.clone(),
        });
        Ok(self
            .tables
            .get(type_name)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn update_column(&mut self, record: &Record, column: &str, value: Value) -> StoreResult<()> {
        if self.failing_updates.contains(record.type_name()) {
            return Err(StoreError::database_error(
                StoreOperation::UpdateColumn,
                format!("writes to {} are failing", record.type_name()),
            )
            .with_entity(record.type_name(), record.id().to_string()));
        }
        let row = self.row_mut(record, StoreOperation::UpdateColumn)?;
        row.set(column, value);
        Ok(())
    }

    fn transaction<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
    {
        let snapshot = (self.tables.clone(), self.next_ids.clone());
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if result.is_err() {
            tracing::debug!(depth = self.depth, "rolling back in-memory transaction");
            (self.tables, self.next_ids) = snapshot;
        }
        result
    }
}
