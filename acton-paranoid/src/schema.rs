//! Record type descriptors
//!
//! A [`TypeDescriptor`] is everything the engine knows about one record type:
//! its primary key, whether (and by which column) it is soft-deletable, its
//! declared associations and its `destroy` and `restore` callback chains.
//! Descriptors are registered once in a [`Schema`] and read by the engine.
//!
//! # Example
//!
//! ```rust
//! use acton_paranoid::association::{Association, Dependent};
//! use acton_paranoid::schema::{Schema, TypeDescriptor};
//!
//! let schema = Schema::new()
//!     .with_type(
//!         TypeDescriptor::new("Post")
//!             .acts_as_paranoid()
//!             .association(Association::has_many("comments", "Comment").dependent(Dependent::Destroy)),
//!     )
//!     .with_type(TypeDescriptor::new("Comment").acts_as_paranoid_with_column("removed_at"));
//!
//! assert_eq!(schema.descriptor("Post").unwrap().paranoia_column(), Some("deleted_at"));
//! assert_eq!(schema.descriptor("Comment").unwrap().paranoia_column(), Some("removed_at"));
//! ```

use std::collections::HashMap;

use crate::association::Association;
use crate::callbacks::{CallbackChain, Flow, Next};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::Record;

/// Conventional deletion marker column
pub const DEFAULT_PARANOIA_COLUMN: &str = "deleted_at";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParanoiaColumn {
    Off,
    Default,
    Named(String),
}

/// Static description of one record type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    primary_key: String,
    paranoia: ParanoiaColumn,
    associations: Vec<Association>,
    destroy_callbacks: CallbackChain,
    restore_callbacks: CallbackChain,
}

impl TypeDescriptor {
    /// Describe a non-paranoid type with an `id` primary key
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: "id".to_string(),
            paranoia: ParanoiaColumn::Off,
            associations: Vec::new(),
            destroy_callbacks: CallbackChain::default(),
            restore_callbacks: CallbackChain::default(),
        }
    }

    /// Override the primary key column
    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Make the type soft-deletable using the schema's default marker column
    #[must_use]
    pub fn acts_as_paranoid(mut self) -> Self {
        self.paranoia = ParanoiaColumn::Default;
        self
    }

    /// Make the type soft-deletable using `column` as the marker
    #[must_use]
    pub fn acts_as_paranoid_with_column(mut self, column: impl Into<String>) -> Self {
        self.paranoia = ParanoiaColumn::Named(column.into());
        self
    }

    /// Declare an association, filling in conventional column names
    #[must_use]
    pub fn association(mut self, association: Association) -> Self {
        self.associations.push(association.resolve_defaults(&self.name));
        self
    }

    /// Register a before-restore callback
    #[must_use]
    pub fn before_restore<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Record) -> Result<Flow> + Send + Sync + 'static,
    {
        self.restore_callbacks.before(callback);
        self
    }

    /// Register an around-restore callback
    #[must_use]
    pub fn around_restore<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Record, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.restore_callbacks.around(callback);
        self
    }

    /// Register an after-restore callback
    #[must_use]
    pub fn after_restore<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Record) -> Result<()> + Send + Sync + 'static,
    {
        self.restore_callbacks.after(callback);
        self
    }

    /// Register a before-destroy callback
    #[must_use]
    pub fn before_destroy<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Record) -> Result<Flow> + Send + Sync + 'static,
    {
        self.destroy_callbacks.before(callback);
        self
    }

    /// Register an around-destroy callback
    #[must_use]
    pub fn around_destroy<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Record, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.destroy_callbacks.around(callback);
        self
    }

    /// Register an after-destroy callback
    #[must_use]
    pub fn after_destroy<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Record) -> Result<()> + Send + Sync + 'static,
    {
        self.destroy_callbacks.after(callback);
        self
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary key column
    pub fn primary_key_column(&self) -> &str {
        &self.primary_key
    }

    /// Whether rows of this type are soft-deleted
    pub fn is_paranoid(&self) -> bool {
        self.paranoia != ParanoiaColumn::Off
    }

    /// Deletion marker column, for paranoid types
    pub fn paranoia_column(&self) -> Option<&str> {
        match &self.paranoia {
            ParanoiaColumn::Off => None,
            ParanoiaColumn::Default => Some(DEFAULT_PARANOIA_COLUMN),
            ParanoiaColumn::Named(column) => Some(column),
        }
    }

    /// Whether `record` carries a deletion marker
    ///
    /// Always `false` for non-paranoid types.
    pub fn is_deleted(&self, record: &Record) -> bool {
        self.paranoia_column()
            .is_some_and(|column| !record.get(column).is_null())
    }

    /// Declared associations, in declaration order
    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Association by name
    pub fn association_named(&self, name: &str) -> Result<&Association> {
        self.associations
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::UnknownAssociation {
                type_name: self.name.clone(),
                association: name.to_string(),
            })
    }

    /// Associations flagged `dependent: destroy`
    pub fn dependent_associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.iter().filter(|a| a.cascades())
    }

    /// The destroy callback chain
    pub fn destroy_callbacks(&self) -> &CallbackChain {
        &self.destroy_callbacks
    }

    /// The restore callback chain
    pub fn restore_callbacks(&self) -> &CallbackChain {
        &self.restore_callbacks
    }

    /// Mutable destroy callback chain
    pub fn destroy_callbacks_mut(&mut self) -> &mut CallbackChain {
        &mut self.destroy_callbacks
    }

    /// Mutable restore callback chain
    pub fn restore_callbacks_mut(&mut self) -> &mut CallbackChain {
        &mut self.restore_callbacks
    }

    /// A new, unsaved record of this type
    pub fn build(&self) -> Record {
        Record::new(self.name.clone(), self.primary_key.clone())
    }
}

/// Registry of every record type the engine can reach
#[derive(Debug, Clone)]
pub struct Schema {
    types: HashMap<String, TypeDescriptor>,
    default_column: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            types: HashMap::new(),
            default_column: DEFAULT_PARANOIA_COLUMN.to_string(),
        }
    }
}

impl Schema {
    /// Empty schema using `deleted_at` as the default marker column
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty schema using the configured default marker column
    pub fn from_config(config: &Config) -> Self {
        Self {
            types: HashMap::new(),
            default_column: config.soft_delete.column.clone(),
        }
    }

    /// Default marker column for types without an explicit one
    pub fn default_column(&self) -> &str {
        &self.default_column
    }

    /// Register (or replace) a type
    pub fn register(&mut self, mut descriptor: TypeDescriptor) -> &mut Self {
        if descriptor.paranoia == ParanoiaColumn::Default {
            descriptor.paranoia = ParanoiaColumn::Named(self.default_column.clone());
        }
        tracing::debug!(
            record_type = descriptor.name(),
            paranoid = descriptor.is_paranoid(),
            associations = descriptor.associations().len(),
            "registered record type"
        );
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Builder-style [`Schema::register`]
    #[must_use]
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Whether a type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Descriptor of a registered type
    pub fn descriptor(&self, name: &str) -> Result<&TypeDescriptor> {
        self.types
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// Mutable descriptor of a registered type
    pub fn descriptor_mut(&mut self, name: &str) -> Result<&mut TypeDescriptor> {
        self.types
            .get_mut(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }
}
