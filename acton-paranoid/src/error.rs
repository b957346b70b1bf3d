//! Error types

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the soft-delete engine
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Error raised by the persistence backend
    #[error("{0}")]
    Store(#[from] StoreError),

    /// No type with this name is registered in the schema
    #[error("Unknown record type: {0}")]
    UnknownType(String),

    /// The type declares no association with this name
    #[error("Unknown association {association} on {type_name}")]
    UnknownAssociation {
        /// Owning record type
        type_name: String,
        /// Association name
        association: String,
    },

    /// The operation needs a soft-deletable type
    #[error("Record type {0} is not paranoid")]
    NotParanoid(String),

    /// Error raised from a lifecycle callback
    #[error("Callback error: {0}")]
    Callback(String),

    /// Logging could not be initialized
    #[error("Tracing error: {0}")]
    Tracing(String),
}

impl Error {
    /// Whether this error reports a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
