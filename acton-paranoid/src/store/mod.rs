//! Persistence capabilities consumed by the soft-delete engine
//!
//! The engine never talks to a database directly. It needs exactly two
//! capabilities from its backend:
//!
//! - [`HardDeletable`]: physically remove a row
//! - [`DataStore`]: filtered selects, single-column writes, inserts and an
//!   atomic transaction primitive
//!
//! [`MemoryStore`] implements both over in-process tables and backs the test
//! suite.
//!
//! # Example
//!
//! ```rust
//! use acton_paranoid::filter::Filter;
//! use acton_paranoid::store::{DataStore, MemoryStore};
//! use acton_paranoid::Record;
//!
//! let mut store = MemoryStore::new();
//! let mut post = Record::new("Post", "id").with("title", "hello");
//! store.insert(&mut post).unwrap();
//!
//! let rows = store.select("Post", &Filter::new().and_eq("title", "hello")).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert!(!rows[0].is_new_record());
//! ```

mod error;
mod memory;

pub use error::{StoreError, StoreErrorKind, StoreOperation};
pub use memory::{MemoryStore, SelectLog};

use crate::filter::{Filter, Value};
use crate::record::Record;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Physical row removal
///
/// This is the primitive the paranoid layer wraps: soft deletion replaces it
/// for normal destroys, and permanent deletion calls through to it.
pub trait HardDeletable {
    /// Remove the record's row
    ///
    /// Returns `true` if a row was removed, `false` if none existed.
    fn delete_row(&mut self, record: &Record) -> StoreResult<bool>;
}

/// Query and write capabilities of a persistence backend
pub trait DataStore: HardDeletable {
    /// Persist a new record, assigning an id when the record has none
    ///
    /// The record is marked persisted on success.
    fn insert(&mut self, record: &mut Record) -> StoreResult<()>;

    /// Load every row of `type_name` matching `filter`, in storage order
    ///
    /// Returned records are marked persisted.
    fn select(&self, type_name: &str, filter: &Filter) -> StoreResult<Vec<Record>>;

    /// Write a single column of the record's row, bypassing callbacks
    fn update_column(&mut self, record: &Record, column: &str, value: Value) -> StoreResult<()>;

    /// Run `f` atomically
    ///
    /// Commits when `f` returns `Ok` and rolls back every write made inside
    /// it when `f` returns `Err`. Transactions nest; an inner failure that
    /// propagates rolls back the outer transaction too.
    fn transaction<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        Self: Sized,
        E: From<StoreError>,
        F: FnOnce(&mut Self) -> std::result::Result<T, E>;

    /// First row of `type_name` matching `filter`
    fn select_first(&self, type_name: &str, filter: &Filter) -> StoreResult<Option<Record>> {
        Ok(self.select(type_name, filter)?.into_iter().next())
    }
}
