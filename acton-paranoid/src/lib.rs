//! # acton-paranoid
//!
//! Soft deletion for record graphs. Destroying a record of a paranoid type
//! stamps a deletion marker column instead of removing the row; the record
//! disappears from active queries, can be restored, and can still be removed
//! for good.
//!
//! ## Features
//!
//! - **Explicit scopes**: every query names `Active`, `WithDeleted` or `OnlyDeleted`
//! - **Cascading restore**: soft-deleted `dependent: destroy` targets come back with their owner
//! - **Cascading permanent delete**: `really_destroy` removes the whole dependent subtree
//! - **Associations**: belongs-to, has-one, has-many, polymorphic and has-many-through
//! - **Lifecycle callbacks**: before/around/after chains for destroy and restore, with veto
//! - **Pluggable storage**: any backend implementing [`DataStore`], with an in-memory reference store
//!
//! ## Example
//!
//! ```rust
//! use acton_paranoid::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = Config::default();
//!
//!     let schema = Schema::from_config(&config)
//!         .with_type(
//!             TypeDescriptor::new("Post")
//!                 .acts_as_paranoid()
//!                 .association(Association::has_many("comments", "Comment").dependent(Dependent::Destroy)),
//!         )
//!         .with_type(TypeDescriptor::new("Comment").acts_as_paranoid());
//!
//!     let mut paranoid = Paranoid::new(schema, MemoryStore::new());
//!     let mut post = Record::new("Post", "id").with("title", "hello");
//!     paranoid.insert(&mut post)?;
//!
//!     paranoid.destroy(&mut post)?;
//!     assert!(paranoid.is_deleted(&post)?);
//!
//!     paranoid.restore(&mut post, RestoreOptions::default())?;
//!     assert!(!paranoid.is_deleted(&post)?);
//!
//!     paranoid.really_destroy(&mut post)?;
//!     assert!(paranoid.is_really_destroyed(&post));
//!     Ok(())
//! }
//! ```

pub mod association;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod filter;
pub mod observability;
pub mod paranoid;
pub mod record;
pub mod schema;
pub mod scope;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use filter::{Filter, FilterCondition, Value};
pub use paranoid::{Paranoid, RestoreOptions};
pub use record::Record;
pub use schema::{Schema, TypeDescriptor};
pub use scope::{Relation, Scope};
pub use store::{DataStore, HardDeletable, MemoryStore, StoreError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::association::{Association, AssociationKind, Dependent};
    pub use crate::callbacks::{CallbackChain, Flow, Next};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::filter::{Filter, FilterCondition, FilterOperator, Value};
    pub use crate::observability::init_tracing;
    pub use crate::paranoid::{Paranoid, RestoreOptions};
    pub use crate::record::Record;
    pub use crate::schema::{Schema, TypeDescriptor};
    pub use crate::scope::{Relation, Scope};
    pub use crate::store::{
        DataStore, HardDeletable, MemoryStore, StoreError, StoreErrorKind, StoreOperation,
    };
}
