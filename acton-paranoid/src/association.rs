//! Declared associations and how to resolve them
//!
//! An [`Association`] is static metadata declared on a
//! [`TypeDescriptor`](crate::schema::TypeDescriptor). Resolution is two pure
//! functions over that metadata and one source record:
//!
//! - [`derive_filter`] builds the predicate locating the target rows
//! - [`is_resolvable`] decides whether a lookup should be attempted at all
//!
//! # Example
//!
//! ```rust
//! use acton_paranoid::association::{derive_filter, is_resolvable, Association, Dependent};
//! use acton_paranoid::Record;
//!
//! let comments = Association::has_many("comments", "Comment")
//!     .as_polymorphic("commentable")
//!     .dependent(Dependent::Destroy)
//!     .resolve_defaults("Post");
//!
//! let post = Record::new("Post", "id").with("id", 1_i64);
//! assert!(is_resolvable(&comments, &post));
//! assert_eq!(
//!     derive_filter(&comments, &post).to_string(),
//!     "commentable_type = Post AND commentable_id = 1"
//! );
//! ```

use std::fmt;

use crate::filter::{Filter, Value};
use crate::record::Record;

/// Kind of relationship between two record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    /// The source row holds the foreign key
    BelongsTo,
    /// At most one target row holds the foreign key
    HasOne,
    /// Any number of target rows hold the foreign key
    HasMany,
    /// Targets reached through an intermediate association
    HasManyThrough,
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelongsTo => write!(f, "belongs_to"),
            Self::HasOne => write!(f, "has_one"),
            Self::HasMany => write!(f, "has_many"),
            Self::HasManyThrough => write!(f, "has_many_through"),
        }
    }
}

/// What happens to targets when the owner is destroyed
///
/// Only [`Dependent::Destroy`] takes part in restore and permanent-delete
/// cascades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependent {
    /// Targets are destroyed (and restored) with their owner
    Destroy,
    /// Targets are deleted without callbacks by the persistence layer
    Delete,
    /// Target foreign keys are cleared by the persistence layer
    Nullify,
}

/// A relationship declared on a source record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    /// Name of the association on the source type
    pub name: String,
    /// Relationship kind
    pub kind: AssociationKind,
    /// Target record type name
    pub target: String,
    /// Column holding the linking identifier
    pub foreign_key: String,
    /// Column on the "one" side that the foreign key references
    pub primary_key: String,
    /// Cascade behavior
    pub dependent: Option<Dependent>,
    /// Polymorphic interface name (`as:`), e.g. `commentable`
    pub as_name: Option<String>,
    /// Intermediate association on the source type (has-many-through)
    pub through: Option<String>,
    /// Association on the intermediate type leading to the target
    pub source: Option<String>,
}

impl Association {
    fn new(kind: AssociationKind, name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            foreign_key: String::new(),
            primary_key: String::new(),
            dependent: None,
            as_name: None,
            through: None,
            source: None,
        }
    }

    /// Declare a belongs-to association
    pub fn belongs_to(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(AssociationKind::BelongsTo, name, target)
    }

    /// Declare a has-one association
    pub fn has_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(AssociationKind::HasOne, name, target)
    }

    /// Declare a has-many association
    pub fn has_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(AssociationKind::HasMany, name, target)
    }

    /// Declare a has-many-through association
    ///
    /// `through` names an association on the source type; `source` names the
    /// association on the intermediate type that reaches the target.
    pub fn has_many_through(
        name: impl Into<String>,
        target: impl Into<String>,
        through: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let mut association = Self::new(AssociationKind::HasManyThrough, name, target);
        association.through = Some(through.into());
        association.source = Some(source.into());
        association
    }

    /// Override the foreign key column
    #[must_use]
    pub fn foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = column.into();
        self
    }

    /// Override the referenced primary key column
    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Set the cascade behavior
    #[must_use]
    pub fn dependent(mut self, dependent: Dependent) -> Self {
        self.dependent = Some(dependent);
        self
    }

    /// Make a has-one/has-many association polymorphic
    #[must_use]
    pub fn as_polymorphic(mut self, interface: impl Into<String>) -> Self {
        self.as_name = Some(interface.into());
        self
    }

    /// Fill in conventional column names for the owning type
    ///
    /// Explicitly configured columns are kept.
    #[must_use]
    pub fn resolve_defaults(mut self, owner: &str) -> Self {
        if self.primary_key.is_empty() {
            self.primary_key = "id".to_string();
        }
        if self.foreign_key.is_empty() {
            self.foreign_key = match (&self.kind, &self.as_name) {
                (AssociationKind::BelongsTo, _) => format!("{}_id", self.name),
                (_, Some(interface)) => format!("{}_id", interface),
                _ => format!("{}_id", snake_case(owner)),
            };
        }
        self
    }

    /// Whether the association yields zero or more targets
    pub fn is_collection(&self) -> bool {
        matches!(
            self.kind,
            AssociationKind::HasMany | AssociationKind::HasManyThrough
        )
    }

    /// Whether this is a belongs-to association
    pub fn is_belongs_to(&self) -> bool {
        self.kind == AssociationKind::BelongsTo
    }

    /// Whether the target's owner is identified by a type discriminator
    pub fn is_polymorphic(&self) -> bool {
        self.as_name.is_some() && !self.is_belongs_to()
    }

    /// Discriminator column on the target, for polymorphic associations
    pub fn type_column(&self) -> Option<String> {
        if self.is_polymorphic() {
            self.as_name.as_ref().map(|interface| format!("{}_type", interface))
        } else {
            None
        }
    }

    /// Whether destroying the owner cascades to this association
    pub fn cascades(&self) -> bool {
        self.dependent == Some(Dependent::Destroy)
    }
}

/// Predicate locating the targets of `association` for `source`
///
/// - belongs-to: target primary key equals the source's foreign key
/// - polymorphic: target type column equals the source type name and the
///   target foreign key equals the source id
/// - otherwise: target foreign key equals the source id
pub fn derive_filter(association: &Association, source: &Record) -> Filter {
    if association.is_belongs_to() {
        return Filter::new().and_eq(
            association.primary_key.as_str(),
            source.get(&association.foreign_key).clone(),
        );
    }

    let filter = match association.type_column() {
        Some(type_column) => Filter::new().and_eq(type_column, Value::from(source.type_name())),
        None => Filter::new(),
    };
    filter.and_eq(association.foreign_key.as_str(), source.id().clone())
}

/// Whether a lookup for `association` from `source` can find anything
///
/// A belongs-to whose foreign key is null has no target. Every other kind is
/// always looked up; an empty result is not a skip.
pub fn is_resolvable(association: &Association, source: &Record) -> bool {
    if association.is_belongs_to() {
        !source.get(&association.foreign_key).is_null()
    } else {
        true
    }
}

fn snake_case(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len() + 4);
    for (i, ch) in type_name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
