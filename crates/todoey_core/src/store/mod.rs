//! Persistent store contract used by the list managers.
//!
//! # Responsibility
//! - Define the record storage seam (query/insert/update/remove/commit).
//! - Keep the two match modes (exact duplicate check, substring search)
//!   distinct at the type level.
//!
//! # Invariants
//! - Mutations are pending until `commit()` succeeds.
//! - Fetches observe pending mutations of the same store.
//! - A failed `commit()` leaves the store at its last committed state.

pub mod sqlite_store;

use crate::db::DbError;
use crate::model::category::{Category, CategoryId};
use crate::model::item::{Item, ItemId};
use crate::model::RecordValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use sqlite_store::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backing-store failure.
#[derive(Debug)]
pub enum StoreError {
    /// Query could not be executed.
    Fetch(DbError),
    /// Insert/update/remove could not be staged.
    Write(DbError),
    /// Pending changes could not be made durable and were rolled back.
    Commit(DbError),
    /// Target record does not exist.
    NotFound(Uuid),
    /// Record failed validation before write.
    Validation(RecordValidationError),
    /// Persisted row cannot be converted into a record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "store fetch failed: {err}"),
            Self::Write(err) => write!(f, "store write failed: {err}"),
            Self::Commit(err) => write!(f, "store commit failed: {err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "todo store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(err) | Self::Write(err) | Self::Commit(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Label match mode for category names and item titles.
///
/// Both modes compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelFilter {
    /// Whole-label equality. Used to block duplicate add/rename.
    Exact(String),
    /// Substring containment. Used by search-as-you-type.
    Contains(String),
}

/// Primary sort column for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Category name or item title.
    Label,
    CreatedAt,
}

/// Category fetch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    pub filter: Option<LabelFilter>,
    /// Record left out of the result, e.g. the category being renamed.
    pub exclude: Option<CategoryId>,
    pub sort: SortKey,
    pub ascending: bool,
}

impl CategoryQuery {
    /// Every category, name ascending.
    pub fn all() -> Self {
        Self {
            filter: None,
            exclude: None,
            sort: SortKey::Label,
            ascending: true,
        }
    }

    /// Categories whose name contains `text`, oldest first.
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            filter: Some(LabelFilter::Contains(text.into())),
            exclude: None,
            sort: SortKey::CreatedAt,
            ascending: true,
        }
    }

    /// Categories whose name equals `name`, other than `exclude`.
    pub fn duplicates_of(name: impl Into<String>, exclude: Option<CategoryId>) -> Self {
        Self {
            filter: Some(LabelFilter::Exact(name.into())),
            exclude,
            sort: SortKey::CreatedAt,
            ascending: true,
        }
    }
}

/// Item fetch request. Always scoped to one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub category_id: CategoryId,
    pub filter: Option<LabelFilter>,
    pub exclude: Option<ItemId>,
    pub sort: SortKey,
    pub ascending: bool,
}

impl ItemQuery {
    /// Every item of the category, title ascending.
    pub fn all(category_id: CategoryId) -> Self {
        Self {
            category_id,
            filter: None,
            exclude: None,
            sort: SortKey::Label,
            ascending: true,
        }
    }

    /// Items of the category whose title contains `text`, oldest first.
    pub fn search(category_id: CategoryId, text: impl Into<String>) -> Self {
        Self {
            category_id,
            filter: Some(LabelFilter::Contains(text.into())),
            exclude: None,
            sort: SortKey::CreatedAt,
            ascending: true,
        }
    }

    /// Items of the category whose title equals `title`, other than `exclude`.
    pub fn duplicates_of(
        category_id: CategoryId,
        title: impl Into<String>,
        exclude: Option<ItemId>,
    ) -> Self {
        Self {
            category_id,
            filter: Some(LabelFilter::Exact(title.into())),
            exclude,
            sort: SortKey::CreatedAt,
            ascending: true,
        }
    }
}

/// Record storage collaborator for the list managers.
///
/// Implementations stage mutations until `commit()`; callers are expected to
/// commit after every insert/update/remove and roll back when staging fails.
pub trait PersistentStore {
    fn fetch_categories(&self, query: &CategoryQuery) -> StoreResult<Vec<Category>>;
    fn find_category(&self, id: CategoryId) -> StoreResult<Option<Category>>;
    fn insert_category(&self, category: &Category) -> StoreResult<()>;
    fn update_category(&self, category: &Category) -> StoreResult<()>;
    /// Removes the category and every item under it.
    ///
    /// Returns the number of items removed alongside the category.
    fn remove_category(&self, id: CategoryId) -> StoreResult<usize>;

    fn fetch_items(&self, query: &ItemQuery) -> StoreResult<Vec<Item>>;
    fn find_item(&self, id: ItemId) -> StoreResult<Option<Item>>;
    fn insert_item(&self, item: &Item) -> StoreResult<()>;
    fn update_item(&self, item: &Item) -> StoreResult<()>;
    fn remove_item(&self, id: ItemId) -> StoreResult<()>;

    /// Makes staged mutations durable.
    fn commit(&self) -> StoreResult<()>;
    /// Discards staged mutations.
    fn rollback(&self) -> StoreResult<()>;
}
