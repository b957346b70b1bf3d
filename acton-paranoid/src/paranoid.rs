//! Soft-delete, restore and permanent-delete engine
//!
//! [`Paranoid`] wraps a [`DataStore`] and a [`Schema`]. For paranoid types it
//! replaces physical removal with stamping the deletion marker, and it owns the
//! two cascades:
//!
//! - **restore** clears the marker and, unless asked not to, restores every
//!   soft-deleted `dependent: destroy` target, recursively, in one transaction
//! - **really destroy** physically removes every `dependent: destroy` target,
//!   deleted or not, recursively, then the record itself
//!
//! Soft destroy never cascades. A parent's `destroy` only stamps the parent;
//! its dependents are restored later because they were deleted by their own
//! destroys.
//!
//! # Example
//!
//! ```rust
//! use acton_paranoid::prelude::*;
//!
//! let schema = Schema::new()
//!     .with_type(
//!         TypeDescriptor::new("Post")
//!             .acts_as_paranoid()
//!             .association(Association::has_many("comments", "Comment").dependent(Dependent::Destroy)),
//!     )
//!     .with_type(TypeDescriptor::new("Comment").acts_as_paranoid());
//! let mut paranoid = Paranoid::new(schema, MemoryStore::new());
//!
//! let mut post = Record::new("Post", "id");
//! paranoid.insert(&mut post).unwrap();
//! let mut comment = Record::new("Comment", "id").with("post_id", post.id().clone());
//! paranoid.insert(&mut comment).unwrap();
//!
//! paranoid.destroy(&mut comment).unwrap();
//! paranoid.destroy(&mut post).unwrap();
//! assert_eq!(paranoid.active("Post").unwrap().count(paranoid.store()).unwrap(), 0);
//!
//! assert!(paranoid.restore(&mut post, RestoreOptions::default()).unwrap());
//! assert_eq!(paranoid.active("Comment").unwrap().count(paranoid.store()).unwrap(), 1);
//! ```

use std::sync::Arc;

use chrono::Utc;

use crate::association::{derive_filter, is_resolvable, Association};
use crate::error::{Error, Result};
use crate::filter::Value;
use crate::record::Record;
use crate::schema::{Schema, TypeDescriptor};
use crate::scope::{Relation, Scope};
use crate::store::{DataStore, StoreError, StoreOperation};

/// Options for [`Paranoid::restore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Restore soft-deleted dependents too
    pub recursive: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self { recursive: true }
    }
}

impl RestoreOptions {
    /// Restore only the record itself
    pub fn non_recursive() -> Self {
        Self { recursive: false }
    }
}

/// Soft-delete engine over a persistence backend
#[derive(Debug)]
pub struct Paranoid<S> {
    schema: Arc<Schema>,
    store: S,
}

impl<S: DataStore> Paranoid<S> {
    /// Create an engine over `store` for the types registered in `schema`
    pub fn new(schema: impl Into<Arc<Schema>>, store: S) -> Self {
        Self {
            schema: schema.into(),
            store,
        }
    }

    /// Registered types
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable backing store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the engine, returning its store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Persist a new record of a registered type
    pub fn insert(&mut self, record: &mut Record) -> Result<()> {
        self.schema.descriptor(record.type_name())?;
        self.store.insert(record)?;
        Ok(())
    }

    /// Whether `type_name` is soft-deletable
    pub fn is_paranoid(&self, type_name: &str) -> Result<bool> {
        Ok(self.schema.descriptor(type_name)?.is_paranoid())
    }

    /// Whether `record`'s type is soft-deletable
    pub fn record_is_paranoid(&self, record: &Record) -> Result<bool> {
        self.is_paranoid(record.type_name())
    }

    // Views

    /// Rows of `type_name` without a deletion marker
    ///
    /// Non-paranoid types have no marker, so this is every row.
    pub fn active(&self, type_name: &str) -> Result<Relation> {
        Ok(Relation::new(self.schema.descriptor(type_name)?, Scope::Active))
    }

    /// Every row of a paranoid type
    pub fn with_deleted(&self, type_name: &str) -> Result<Relation> {
        Ok(Relation::new(self.paranoid_descriptor(type_name)?, Scope::WithDeleted))
    }

    /// Soft-deleted rows of a paranoid type
    pub fn only_deleted(&self, type_name: &str) -> Result<Relation> {
        Ok(Relation::new(self.paranoid_descriptor(type_name)?, Scope::OnlyDeleted))
    }

    /// Alias for [`Paranoid::only_deleted`]
    pub fn deleted(&self, type_name: &str) -> Result<Relation> {
        self.only_deleted(type_name)
    }

    /// Active row of `type_name` by id
    pub fn find(&self, type_name: &str, id: impl Into<Value>) -> Result<Record> {
        self.active(type_name)?.find(&self.store, id)
    }

    // Soft removal

    /// Soft destroy: stamp the marker inside the destroy callbacks
    ///
    /// Runs in a transaction. Returns `false` when a callback vetoed.
    /// Frozen records are left untouched. Dependents are not touched.
    /// On error the record is reset to its state before the call.
    /// For non-paranoid types this is [`Paranoid::hard_destroy`].
    pub fn destroy(&mut self, record: &mut Record) -> Result<bool> {
        let schema = &*self.schema;
        let descriptor = schema.descriptor(record.type_name())?;
        let Some(column) = descriptor.paranoia_column() else {
            return hard_destroy_record(schema, &mut self.store, record);
        };

        let before = record.clone();
        let destroyed = self
            .store
            .transaction(|tx| {
                descriptor.destroy_callbacks().run(record, |r| {
                    if r.is_frozen() {
                        return Ok(());
                    }
                    write_marker(tx, r, column, Utc::now().into())
                })
            })
            .map_err(|e| {
                *record = before;
                e
            })?;

        if destroyed {
            tracing::debug!(record_type = record.type_name(), id = %record.id(), "soft destroyed record");
        } else {
            tracing::warn!(record_type = record.type_name(), id = %record.id(), "destroy vetoed by callback");
        }
        Ok(destroyed)
    }

    /// Soft delete: stamp the marker without callbacks or a transaction
    ///
    /// No-op for records never persisted and for frozen records. For
    /// non-paranoid types this is [`Paranoid::hard_delete`].
    pub fn delete(&mut self, record: &mut Record) -> Result<()> {
        let descriptor = self.schema.descriptor(record.type_name())?;
        let Some(column) = descriptor.paranoia_column() else {
            return hard_delete_record(&mut self.store, record);
        };
        if record.is_new_record() || record.is_frozen() {
            return Ok(());
        }
        write_marker(&mut self.store, record, column, Utc::now().into())
    }

    // Restore

    /// Clear the marker and, unless `options.recursive` is false, restore
    /// soft-deleted dependents
    ///
    /// Everything happens in one transaction around the restore callbacks; any
    /// error rolls back the whole cascade and resets `record` to its state
    /// before the call. Returns `false` when the record's own
    /// callbacks vetoed. A dependent vetoed by its own callbacks stays deleted
    /// without failing the restore.
    pub fn restore(&mut self, record: &mut Record, options: RestoreOptions) -> Result<bool> {
        let schema = &*self.schema;
        let before = record.clone();
        let restored = self
            .store
            .transaction(|tx| restore_record(schema, tx, record, options))
            .map_err(|e| {
                *record = before;
                e
            })?;

        if restored {
            tracing::info!(
                record_type = record.type_name(),
                id = %record.id(),
                recursive = options.recursive,
                "restored record"
            );
        }
        Ok(restored)
    }

    /// Restore the soft-deleted row of `type_name` with this id
    ///
    /// # Errors
    ///
    /// A not-found error when no soft-deleted row has this id.
    pub fn restore_by_id(
        &mut self,
        type_name: &str,
        id: impl Into<Value>,
        options: RestoreOptions,
    ) -> Result<Record> {
        let mut record = self.only_deleted(type_name)?.find(&self.store, id)?;
        self.restore(&mut record, options)?;
        Ok(record)
    }

    /// Restore several soft-deleted rows, in order
    ///
    /// Stops at the first id without a soft-deleted row; rows restored before
    /// it stay restored.
    pub fn restore_many(
        &mut self,
        type_name: &str,
        ids: &[Value],
        options: RestoreOptions,
    ) -> Result<Vec<Record>> {
        ids.iter()
            .map(|id| self.restore_by_id(type_name, id.clone(), options))
            .collect()
    }

    // Permanent removal

    /// Physically remove the record and its `dependent: destroy` subtree
    ///
    /// Dependents of paranoid types are found whether soft-deleted or not.
    /// Each dependent is really destroyed before the record itself is hard
    /// destroyed. Returns the record's own hard-destroy outcome.
    pub fn really_destroy(&mut self, record: &mut Record) -> Result<bool> {
        let removed = really_destroy_record(&self.schema, &mut self.store, record)?;
        if removed {
            tracing::info!(record_type = record.type_name(), id = %record.id(), "really destroyed record");
        } else {
            tracing::warn!(record_type = record.type_name(), id = %record.id(), "really destroy vetoed by callback");
        }
        Ok(removed)
    }

    /// Remove the row inside the destroy callbacks, without cascading
    pub fn hard_destroy(&mut self, record: &mut Record) -> Result<bool> {
        hard_destroy_record(&self.schema, &mut self.store, record)
    }

    /// Remove the row without callbacks
    pub fn hard_delete(&mut self, record: &mut Record) -> Result<()> {
        hard_delete_record(&mut self.store, record)
    }

    // State

    /// Whether the record is deleted
    ///
    /// Paranoid types: the marker is set. Other types: the row was removed.
    pub fn is_deleted(&self, record: &Record) -> Result<bool> {
        let descriptor = self.schema.descriptor(record.type_name())?;
        Ok(if descriptor.is_paranoid() {
            descriptor.is_deleted(record)
        } else {
            record.is_removed()
        })
    }

    /// Alias for [`Paranoid::is_deleted`]
    pub fn is_destroyed(&self, record: &Record) -> Result<bool> {
        self.is_deleted(record)
    }

    /// Whether the record's row was physically removed
    pub fn is_really_destroyed(&self, record: &Record) -> bool {
        record.is_removed()
    }

    /// Whether the record exists in storage
    ///
    /// Soft-deleted records of paranoid types still count as persisted.
    pub fn is_persisted(&self, record: &Record) -> Result<bool> {
        let paranoid = self.record_is_paranoid(record)?;
        Ok(!record.is_new_record() && (paranoid || !record.is_removed()))
    }

    /// Whether no active row other than `except_id` has `value` in `column`
    ///
    /// Soft-deleted rows never conflict.
    pub fn is_unique(
        &self,
        type_name: &str,
        column: &str,
        value: impl Into<Value>,
        except_id: Option<&Value>,
    ) -> Result<bool> {
        let rows = self.active(type_name)?.where_eq(column, value).load(&self.store)?;
        Ok(rows.iter().all(|row| Some(row.id()) == except_id))
    }

    fn paranoid_descriptor(&self, type_name: &str) -> Result<&TypeDescriptor> {
        let descriptor = self.schema.descriptor(type_name)?;
        if descriptor.is_paranoid() {
            Ok(descriptor)
        } else {
            Err(Error::NotParanoid(type_name.to_string()))
        }
    }
}

fn write_marker<S: DataStore>(
    store: &mut S,
    record: &mut Record,
    column: &str,
    value: Value,
) -> Result<()> {
    if !record.is_new_record() {
        store.update_column(record, column, value.clone())?;
    }
    record.set(column, value);
    Ok(())
}

fn restore_record<S: DataStore>(
    schema: &Schema,
    store: &mut S,
    record: &mut Record,
    options: RestoreOptions,
) -> Result<bool> {
    let descriptor = schema.descriptor(record.type_name())?;
    let column = descriptor
        .paranoia_column()
        .ok_or_else(|| Error::NotParanoid(record.type_name().to_string()))?;
    if record.is_removed() {
        return Err(StoreError::read_only(
            StoreOperation::UpdateColumn,
            "cannot restore a permanently removed record",
        )
        .with_entity(record.type_name(), record.id().to_string())
        .into());
    }

    descriptor.restore_callbacks().run(record, |r| {
        write_marker(store, r, column, Value::Null)?;
        if options.recursive {
            restore_dependents(schema, store, r)?;
        }
        Ok(())
    })
}

fn restore_dependents<S: DataStore>(schema: &Schema, store: &mut S, record: &Record) -> Result<()> {
    let descriptor = schema.descriptor(record.type_name())?;
    for association in descriptor.dependent_associations() {
        if !schema.descriptor(&association.target)?.is_paranoid() {
            tracing::debug!(
                association = %association.name,
                target = %association.target,
                "skipping restore of non-paranoid dependent"
            );
            continue;
        }

        let mut children = association_targets(schema, store, record, association, Scope::OnlyDeleted)?;
        if !association.is_collection() {
            children.truncate(1);
        }
        tracing::debug!(
            record_type = record.type_name(),
            id = %record.id(),
            association = %association.name,
            count = children.len(),
            "restoring dependents"
        );

        for mut child in children {
            let restored = store.transaction(|tx| {
                restore_record(schema, tx, &mut child, RestoreOptions::default())
            })?;
            if !restored {
                tracing::warn!(
                    record_type = child.type_name(),
                    id = %child.id(),
                    "dependent restore vetoed by callback"
                );
            }
        }
    }
    Ok(())
}

fn really_destroy_record<S: DataStore>(schema: &Schema, store: &mut S, record: &mut Record) -> Result<bool> {
    let descriptor = schema.descriptor(record.type_name())?;
    for association in descriptor.dependent_associations() {
        let scope = if schema.descriptor(&association.target)?.is_paranoid() {
            Scope::WithDeleted
        } else {
            Scope::Active
        };
        let mut children = association_targets(schema, store, record, association, scope)?;
        if !association.is_collection() {
            children.truncate(1);
        }
        tracing::debug!(
            record_type = record.type_name(),
            id = %record.id(),
            association = %association.name,
            count = children.len(),
            "really destroying dependents"
        );

        for child in &mut children {
            really_destroy_record(schema, store, child)?;
        }
    }
    hard_destroy_record(schema, store, record)
}

fn hard_destroy_record<S: DataStore>(schema: &Schema, store: &mut S, record: &mut Record) -> Result<bool> {
    let descriptor = schema.descriptor(record.type_name())?;
    descriptor.destroy_callbacks().run(record, |r| {
        if !r.is_new_record() && !store.delete_row(r)? {
            tracing::debug!(record_type = r.type_name(), id = %r.id(), "row already gone");
        }
        r.mark_removed();
        Ok(())
    })
}

fn hard_delete_record<S: DataStore>(store: &mut S, record: &mut Record) -> Result<()> {
    if !record.is_new_record() {
        store.delete_row(record)?;
    }
    record.mark_removed();
    Ok(())
}

/// Target rows of `association` from `record`, visible in `scope`
///
/// Has-many-through walks the intermediate association (active rows only),
/// then the source association from each intermediate row. Unresolvable
/// associations yield no rows without querying.
fn association_targets<S: DataStore>(
    schema: &Schema,
    store: &S,
    record: &Record,
    association: &Association,
    scope: Scope,
) -> Result<Vec<Record>> {
    if !is_resolvable(association, record) {
        tracing::debug!(
            record_type = record.type_name(),
            id = %record.id(),
            association = %association.name,
            "skipping unresolvable association"
        );
        return Ok(Vec::new());
    }

    let (Some(through), Some(source)) = (&association.through, &association.source) else {
        let target = schema.descriptor(&association.target)?;
        return Relation::new(target, scope)
            .and(derive_filter(association, record))
            .load(store);
    };

    let through = schema.descriptor(record.type_name())?.association_named(through)?;
    let source = schema.descriptor(&through.target)?.association_named(source)?;

    let mut found: Vec<Record> = Vec::new();
    for intermediate in association_targets(schema, store, record, through, Scope::Active)? {
        for candidate in association_targets(schema, store, &intermediate, source, scope)? {
            if !found.iter().any(|row| row.id() == candidate.id()) {
                found.push(candidate);
            }
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::Dependent;
    use crate::callbacks::Flow;
    use crate::store::MemoryStore;

    fn engine(schema: Schema) -> Paranoid<MemoryStore> {
        Paranoid::new(schema, MemoryStore::new())
    }

    fn blog() -> Schema {
        Schema::new()
            .with_type(
                TypeDescriptor::new("Post")
                    .acts_as_paranoid()
                    .association(Association::has_many("comments", "Comment").dependent(Dependent::Destroy))
                    .association(Association::has_one("cover", "Image").dependent(Dependent::Destroy)),
            )
            .with_type(TypeDescriptor::new("Comment").acts_as_paranoid())
            .with_type(TypeDescriptor::new("Image").acts_as_paranoid())
            .with_type(TypeDescriptor::new("Tag"))
    }

    fn create(paranoid: &mut Paranoid<MemoryStore>, type_name: &str, fields: &[(&str, Value)]) -> Record {
        let mut record = paranoid.schema().descriptor(type_name).unwrap().build();
        for (column, value) in fields {
            record.set(*column, value.clone());
        }
        paranoid.insert(&mut record).unwrap();
        record
    }

    #[test]
    fn test_destroy_stamps_marker_and_hides_row() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);

        assert!(paranoid.destroy(&mut post).unwrap());
        assert!(paranoid.is_deleted(&post).unwrap());
        assert!(paranoid.is_destroyed(&post).unwrap());
        assert!(paranoid.is_persisted(&post).unwrap());
        assert!(!paranoid.store().reload(&post).unwrap().get("deleted_at").is_null());
        assert!(paranoid.find("Post", post.id().clone()).unwrap_err().is_not_found());
        assert_eq!(paranoid.with_deleted("Post").unwrap().count(paranoid.store()).unwrap(), 1);
    }

    #[test]
    fn test_destroy_vetoed_leaves_row_active() {
        let schema = Schema::new().with_type(
            TypeDescriptor::new("Post")
                .acts_as_paranoid()
                .before_destroy(|_| Ok(Flow::Halt)),
        );
        let mut paranoid = engine(schema);
        let mut post = create(&mut paranoid, "Post", &[]);

        assert!(!paranoid.destroy(&mut post).unwrap());
        assert!(!paranoid.is_deleted(&post).unwrap());
        assert_eq!(paranoid.active("Post").unwrap().count(paranoid.store()).unwrap(), 1);
    }

    #[test]
    fn test_destroy_does_not_cascade() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);
        let comment = create(&mut paranoid, "Comment", &[("post_id", post.id().clone())]);

        paranoid.destroy(&mut post).unwrap();
        let stored = paranoid.store().reload(&comment).unwrap();
        assert!(stored.get("deleted_at").is_null());
    }

    #[test]
    fn test_destroy_frozen_record_is_noop() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);
        post.freeze();

        assert!(paranoid.destroy(&mut post).unwrap());
        assert!(!paranoid.is_deleted(&post).unwrap());
    }

    #[test]
    fn test_destroy_non_paranoid_removes_row() {
        let mut paranoid = engine(blog());
        let mut tag = create(&mut paranoid, "Tag", &[]);

        assert!(paranoid.destroy(&mut tag).unwrap());
        assert!(paranoid.is_really_destroyed(&tag));
        assert!(paranoid.is_deleted(&tag).unwrap());
        assert!(!paranoid.is_persisted(&tag).unwrap());
        assert_eq!(paranoid.store().row_count("Tag"), 0);
    }

    #[test]
    fn test_delete_skips_callbacks_and_new_records() {
        let schema = Schema::new().with_type(
            TypeDescriptor::new("Post")
                .acts_as_paranoid()
                .before_destroy(|_| Ok(Flow::Halt)),
        );
        let mut paranoid = engine(schema);
        let mut post = create(&mut paranoid, "Post", &[]);

        paranoid.delete(&mut post).unwrap();
        assert!(paranoid.is_deleted(&post).unwrap());

        let mut unsaved = paranoid.schema().descriptor("Post").unwrap().build();
        paranoid.delete(&mut unsaved).unwrap();
        assert!(!paranoid.is_deleted(&unsaved).unwrap());
    }

    #[test]
    fn test_restore_round_trip_and_cascade() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);
        let mut comment = create(&mut paranoid, "Comment", &[("post_id", post.id().clone())]);
        let mut cover = create(&mut paranoid, "Image", &[("post_id", post.id().clone())]);

        paranoid.destroy(&mut comment).unwrap();
        paranoid.destroy(&mut cover).unwrap();
        paranoid.destroy(&mut post).unwrap();

        assert!(paranoid.restore(&mut post, RestoreOptions::default()).unwrap());
        assert!(!paranoid.is_deleted(&post).unwrap());
        assert_eq!(paranoid.active("Comment").unwrap().count(paranoid.store()).unwrap(), 1);
        assert_eq!(paranoid.active("Image").unwrap().count(paranoid.store()).unwrap(), 1);
    }

    #[test]
    fn test_restore_has_one_restores_first_match_only() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);
        let mut first = create(&mut paranoid, "Image", &[("post_id", post.id().clone())]);
        let mut second = create(&mut paranoid, "Image", &[("post_id", post.id().clone())]);
        paranoid.destroy(&mut first).unwrap();
        paranoid.destroy(&mut second).unwrap();
        paranoid.destroy(&mut post).unwrap();

        assert!(paranoid.restore(&mut post, RestoreOptions::default()).unwrap());

        let active = paranoid.active("Image").unwrap().load(paranoid.store()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), first.id());
        let deleted = paranoid.only_deleted("Image").unwrap().load(paranoid.store()).unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].id(), second.id());
    }

    #[test]
    fn test_restore_non_recursive_leaves_dependents() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);
        let mut comment = create(&mut paranoid, "Comment", &[("post_id", post.id().clone())]);
        paranoid.destroy(&mut comment).unwrap();
        paranoid.destroy(&mut post).unwrap();

        assert!(paranoid.restore(&mut post, RestoreOptions::non_recursive()).unwrap());
        assert!(!paranoid.is_deleted(&post).unwrap());
        assert_eq!(paranoid.only_deleted("Comment").unwrap().count(paranoid.store()).unwrap(), 1);
    }

    #[test]
    fn test_restore_non_paranoid_type_fails() {
        let mut paranoid = engine(blog());
        let mut tag = create(&mut paranoid, "Tag", &[]);
        let error = paranoid.restore(&mut tag, RestoreOptions::default()).unwrap_err();
        assert!(matches!(error, Error::NotParanoid(name) if name == "Tag"));
        assert!(matches!(paranoid.with_deleted("Tag"), Err(Error::NotParanoid(_))));
        assert!(matches!(paranoid.deleted("Tag"), Err(Error::NotParanoid(_))));
    }

    #[test]
    fn test_restore_removed_record_fails() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);
        paranoid.really_destroy(&mut post).unwrap();
        let error = paranoid.restore(&mut post, RestoreOptions::default()).unwrap_err();
        assert!(matches!(error, Error::Store(e) if e.kind == crate::store::StoreErrorKind::ReadOnly));
    }

    #[test]
    fn test_restore_by_id_and_many() {
        let mut paranoid = engine(blog());
        let mut first = create(&mut paranoid, "Post", &[]);
        let mut second = create(&mut paranoid, "Post", &[]);
        paranoid.destroy(&mut first).unwrap();
        paranoid.destroy(&mut second).unwrap();

        let restored = paranoid
            .restore_by_id("Post", first.id().clone(), RestoreOptions::default())
            .unwrap();
        assert!(restored.get("deleted_at").is_null());

        // Already active now, so no longer visible to only_deleted
        let error = paranoid
            .restore_many("Post", &[second.id().clone(), first.id().clone()], RestoreOptions::default())
            .unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(paranoid.active("Post").unwrap().count(paranoid.store()).unwrap(), 2);
    }

    #[test]
    fn test_hard_delete_skips_callbacks() {
        let schema = Schema::new().with_type(
            TypeDescriptor::new("Post")
                .acts_as_paranoid()
                .before_destroy(|_| Ok(Flow::Halt)),
        );
        let mut paranoid = engine(schema);
        let mut post = create(&mut paranoid, "Post", &[]);

        assert!(!paranoid.hard_destroy(&mut post).unwrap());
        assert_eq!(paranoid.store().row_count("Post"), 1);

        paranoid.hard_delete(&mut post).unwrap();
        assert!(paranoid.is_really_destroyed(&post));
        assert!(post.is_frozen());
        assert_eq!(paranoid.store().row_count("Post"), 0);
    }

    #[test]
    fn test_really_destroy_removes_subtree() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);
        create(&mut paranoid, "Comment", &[("post_id", post.id().clone())]);
        let mut gone = create(&mut paranoid, "Comment", &[("post_id", post.id().clone())]);
        create(&mut paranoid, "Image", &[("post_id", post.id().clone())]);
        paranoid.destroy(&mut gone).unwrap();

        assert!(paranoid.really_destroy(&mut post).unwrap());
        assert!(paranoid.is_really_destroyed(&post));
        assert_eq!(paranoid.store().row_count("Post"), 0);
        assert_eq!(paranoid.store().row_count("Comment"), 0);
        assert_eq!(paranoid.store().row_count("Image"), 0);
    }

    #[test]
    fn test_really_destroy_has_one_removes_first_match_only() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[]);
        create(&mut paranoid, "Image", &[("post_id", post.id().clone())]);
        let second = create(&mut paranoid, "Image", &[("post_id", post.id().clone())]);

        paranoid.really_destroy(&mut post).unwrap();

        assert_eq!(paranoid.store().row_count("Image"), 1);
        assert!(paranoid.store().reload(&second).is_some());
    }

    #[test]
    fn test_is_unique_ignores_deleted_rows() {
        let mut paranoid = engine(blog());
        let mut post = create(&mut paranoid, "Post", &[("slug", "hello".into())]);

        assert!(!paranoid.is_unique("Post", "slug", "hello", None).unwrap());
        assert!(paranoid.is_unique("Post", "slug", "hello", Some(post.id())).unwrap());

        paranoid.destroy(&mut post).unwrap();
        assert!(paranoid.is_unique("Post", "slug", "hello", None).unwrap());
    }

    #[test]
    fn test_type_queries() {
        let mut paranoid = engine(blog());
        assert!(paranoid.is_paranoid("Post").unwrap());
        assert!(!paranoid.is_paranoid("Tag").unwrap());
        assert!(matches!(paranoid.is_paranoid("Ghost"), Err(Error::UnknownType(_))));

        let mut ghost = Record::new("Ghost", "id");
        assert!(matches!(paranoid.insert(&mut ghost), Err(Error::UnknownType(_))));

        let tag = create(&mut paranoid, "Tag", &[]);
        assert!(!paranoid.record_is_paranoid(&tag).unwrap());
    }
}
