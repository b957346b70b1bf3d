//! Active, with-deleted and only-deleted views
//!
//! Instead of an ambient default scope, every query names its [`Scope`]
//! explicitly. A [`Relation`] couples a record type, a scope and a composable
//! filter, and compiles them into one [`Filter`] for the store.
//!
//! | Scope | Marker predicate |
//! |---|---|
//! | [`Scope::Active`] | `marker IS NULL` |
//! | [`Scope::WithDeleted`] | none |
//! | [`Scope::OnlyDeleted`] | `marker IS NOT NULL` |
//!
//! Non-paranoid types have no marker, so every scope reads all their rows.

use crate::error::Result;
use crate::filter::{Filter, FilterCondition, Value};
use crate::record::Record;
use crate::schema::TypeDescriptor;
use crate::store::{DataStore, StoreError, StoreOperation};

/// Which rows of a paranoid type a query can see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Rows without a deletion marker
    #[default]
    Active,
    /// Every row
    WithDeleted,
    /// Rows with a deletion marker
    OnlyDeleted,
}

impl Scope {
    /// Marker predicate for this scope, if any
    pub fn condition(self, marker: Option<&str>) -> Option<FilterCondition> {
        let marker = marker?;
        match self {
            Self::Active => Some(FilterCondition::is_null(marker)),
            Self::WithDeleted => None,
            Self::OnlyDeleted => Some(FilterCondition::is_not_null(marker)),
        }
    }
}

/// A scoped, filtered query over one record type
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    type_name: String,
    primary_key: String,
    marker: Option<String>,
    scope: Scope,
    filter: Filter,
}

impl Relation {
    /// Unfiltered relation over `descriptor`'s rows visible in `scope`
    pub fn new(descriptor: &TypeDescriptor, scope: Scope) -> Self {
        Self {
            type_name: descriptor.name().to_string(),
            primary_key: descriptor.primary_key_column().to_string(),
            marker: descriptor.paranoia_column().map(str::to_string),
            scope,
            filter: Filter::new(),
        }
    }

    /// Queried record type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Active scope
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Replace the scope, keeping the filter
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Add a condition
    #[must_use]
    pub fn filter_by(mut self, condition: FilterCondition) -> Self {
        self.filter = self.filter.and_condition(condition);
        self
    }

    /// Add an equality condition
    #[must_use]
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter_by(FilterCondition::eq(column, value))
    }

    /// Add every condition of `filter`
    #[must_use]
    pub fn and(mut self, filter: Filter) -> Self {
        self.filter = self.filter.and(filter);
        self
    }

    /// The filter sent to the store: scope predicate first, then user conditions
    pub fn to_filter(&self) -> Filter {
        let scoped = match self.scope.condition(self.marker.as_deref()) {
            Some(condition) => Filter::from(condition),
            None => Filter::new(),
        };
        scoped.and(self.filter.clone())
    }

    /// Every matching row
    pub fn load<S: DataStore>(&self, store: &S) -> Result<Vec<Record>> {
        Ok(store.select(&self.type_name, &self.to_filter())?)
    }

    /// First matching row
    pub fn first<S: DataStore>(&self, store: &S) -> Result<Option<Record>> {
        Ok(store.select_first(&self.type_name, &self.to_filter())?)
    }

    /// Number of matching rows
    pub fn count<S: DataStore>(&self, store: &S) -> Result<usize> {
        Ok(self.load(store)?.len())
    }

    /// Whether any row matches
    pub fn exists<S: DataStore>(&self, store: &S) -> Result<bool> {
        Ok(self.first(store)?.is_some())
    }

    /// The matching row with this id
    ///
    /// # Errors
    ///
    /// A not-found store error when no row with `id` is visible in this
    /// relation, e.g. an active row looked up through an only-deleted view.
    pub fn find<S: DataStore>(&self, store: &S, id: impl Into<Value>) -> Result<Record> {
        let id = id.into();
        let relation = self.clone().where_eq(self.primary_key.clone(), id.clone());
        relation.first(store)?.ok_or_else(|| {
            StoreError::not_found(self.type_name.clone(), id.to_string())
                .with_operation(StoreOperation::Find)
                .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn seeded() -> (TypeDescriptor, MemoryStore) {
        let descriptor = TypeDescriptor::new("Post").acts_as_paranoid();
        let mut store = MemoryStore::new();
        store.insert(&mut descriptor.build().with("title", "live")).unwrap();
        store
            .insert(&mut descriptor.build().with("title", "gone").with("deleted_at", Utc::now()))
            .unwrap();
        (descriptor, store)
    }

    #[test]
    fn test_scope_conditions() {
        assert_eq!(
            Scope::Active.condition(Some("deleted_at")),
            Some(FilterCondition::is_null("deleted_at"))
        );
        assert_eq!(Scope::WithDeleted.condition(Some("deleted_at")), None);
        assert_eq!(
            Scope::OnlyDeleted.condition(Some("deleted_at")),
            Some(FilterCondition::is_not_null("deleted_at"))
        );
        assert_eq!(Scope::OnlyDeleted.condition(None), None);
        assert_eq!(Scope::default(), Scope::Active);
    }

    #[test]
    fn test_views_partition_rows() {
        let (descriptor, store) = seeded();
        assert_eq!(Relation::new(&descriptor, Scope::Active).count(&store).unwrap(), 1);
        assert_eq!(Relation::new(&descriptor, Scope::WithDeleted).count(&store).unwrap(), 2);
        let deleted = Relation::new(&descriptor, Scope::OnlyDeleted).load(&store).unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].get("title"), &Value::from("gone"));
    }

    #[test]
    fn test_only_deleted_find_misses_active_rows() {
        let (descriptor, store) = seeded();
        let error = Relation::new(&descriptor, Scope::OnlyDeleted)
            .find(&store, 1_i64)
            .unwrap_err();
        assert!(error.is_not_found());

        let found = Relation::new(&descriptor, Scope::OnlyDeleted).find(&store, 2_i64).unwrap();
        assert_eq!(found.get("title"), &Value::from("gone"));
    }

    #[test]
    fn test_composition() {
        let (descriptor, store) = seeded();
        let relation = Relation::new(&descriptor, Scope::WithDeleted)
            .where_eq("title", "gone")
            .and(Filter::new().and_eq("id", 2_i64));
        assert!(relation.exists(&store).unwrap());
        assert_eq!(relation.to_filter().conditions().len(), 2);

        let active = relation.with_scope(Scope::Active);
        assert_eq!(active.to_filter().to_string(), "deleted_at IS NULL AND title = gone AND id = 2");
        assert!(!active.exists(&store).unwrap());
    }

    #[test]
    fn test_non_paranoid_type_has_no_marker_predicate() {
        let descriptor = TypeDescriptor::new("Tag");
        let relation = Relation::new(&descriptor, Scope::OnlyDeleted);
        assert!(relation.to_filter().is_empty());
    }
}
