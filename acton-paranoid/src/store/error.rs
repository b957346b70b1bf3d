//! Store error types
//!
//! Structured errors raised by [`DataStore`](super::DataStore) backends, carrying
//! the operation that failed, a category and the entity involved.
//!
//! # Example
//!
//! ```rust
//! use acton_paranoid::store::{StoreError, StoreErrorKind};
//!
//! let error = StoreError::not_found("Post", "7");
//! assert!(matches!(error.kind, StoreErrorKind::NotFound));
//! assert!(error.entity_id.is_some());
//! ```

use std::fmt;

/// Operation being performed when the store error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Finding a single record by id
    Find,
    /// Selecting rows with a filter
    Select,
    /// Inserting a record
    Insert,
    /// Writing a single column
    UpdateColumn,
    /// Physically removing a row
    DeleteRow,
    /// Opening, committing or rolling back a transaction
    Transaction,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find => write!(f, "find"),
            Self::Select => write!(f, "select"),
            Self::Insert => write!(f, "insert"),
            Self::UpdateColumn => write!(f, "update_column"),
            Self::DeleteRow => write!(f, "delete_row"),
            Self::Transaction => write!(f, "transaction"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Record was not found
    NotFound,
    /// Record already exists (duplicate key)
    AlreadyExists,
    /// Record was frozen or never persisted
    ReadOnly,
    /// Transaction could not complete
    TransactionFailed,
    /// Underlying database error
    DatabaseError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ReadOnly => write!(f, "read_only"),
            Self::TransactionFailed => write!(f, "transaction_failed"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured store error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// The operation being performed when the error occurred
    pub operation: StoreOperation,
    /// The category of error
    pub kind: StoreErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The record type involved (e.g., "Post")
    pub entity_type: Option<String>,
    /// The id of the record involved
    pub entity_id: Option<String>,
}

impl StoreError {
    /// Create a new store error
    pub fn new(operation: StoreOperation, kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    ///
    /// ```rust
    /// use acton_paranoid::store::StoreError;
    ///
    /// let error = StoreError::not_found("Post", "7");
    /// assert_eq!(error.entity_type, Some("Post".to_string()));
    /// ```
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(StoreOperation::Find, StoreErrorKind::NotFound, "Record not found")
            .with_entity(entity_type, entity_id)
    }

    /// Create an "already exists" error with entity context
    pub fn already_exists(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::Insert,
            StoreErrorKind::AlreadyExists,
            "Record already exists",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Create a read-only error for frozen or unsaved records
    pub fn read_only(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::ReadOnly, message)
    }

    /// Create a transaction failure
    pub fn transaction_failed(message: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::Transaction,
            StoreErrorKind::TransactionFailed,
            message,
        )
    }

    /// Create a database error
    pub fn database_error(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::DatabaseError, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: StoreOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Whether this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {}
