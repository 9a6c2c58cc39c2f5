//! List managers for categories and items.
//!
//! # Responsibility
//! - Validate add/rename input before any write reaches the store.
//! - Keep one in-memory list per screen, reloaded from the store after every
//!   mutation.
//! - Report list changes and validation failures to the presentation layer.
//!
//! # Invariants
//! - Validation failures never touch the store.
//! - Store failures are logged and surfaced as `ManagerError::Store`; they
//!   never panic and the list is still reloaded.
//! - Duplicate checks use exact case-insensitive equality; search uses
//!   case-insensitive containment.

pub mod category_manager;
pub mod item_manager;
pub mod list_controller;

use crate::store::{PersistentStore, StoreError, StoreResult};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use category_manager::CategoryManager;
pub use item_manager::ItemManager;
pub use list_controller::{ActionOutcome, ListController, RowAction, SearchOutcome};

pub type ManagerResult<T> = Result<T, ManagerError>;

const EMPTY_INPUT_MESSAGE: &str = "TextField is empty! Please enter a valid text.";

/// User-facing validation failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Input is blank after trimming.
    EmptyInput,
    /// Rename to the exact current label.
    SameName,
    /// Another category already uses the name.
    DuplicateName,
    /// Another item in the same category already uses the title.
    DuplicateTitle,
}

impl ValidationKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::SameName => "same_name",
            Self::DuplicateName => "duplicate_name",
            Self::DuplicateTitle => "duplicate_title",
        }
    }

    /// Message shown in the error dialog. `entity` is `Category` or `Item`.
    pub fn message(self, entity: &str) -> String {
        match self {
            Self::EmptyInput => EMPTY_INPUT_MESSAGE.to_string(),
            Self::SameName => {
                format!("New {entity} name cannot be the same as the previous name.")
            }
            Self::DuplicateName => format!("A {entity} with this name already exists."),
            Self::DuplicateTitle => {
                format!("An {entity} with this title already exists in this category.")
            }
        }
    }
}

impl Display for ValidationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned by manager operations.
#[derive(Debug)]
pub enum ManagerError {
    /// Input rejected; nothing was written.
    Validation(ValidationKind),
    /// Target record does not exist (or is outside the item scope).
    NotFound(Uuid),
    /// Row index outside the visible list.
    RowOutOfRange { row: usize, len: usize },
    /// Backing store failed; the list was reloaded from actual store state.
    Store(StoreError),
}

impl ManagerError {
    /// Validation kind, when this is a user input error.
    pub fn validation_kind(&self) -> Option<ValidationKind> {
        match self {
            Self::Validation(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(kind) => write!(f, "validation failed: {kind}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::RowOutOfRange { row, len } => {
                write!(f, "row {row} out of range for list of {len}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ManagerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Presentation callbacks fired by a manager.
///
/// Both methods default to no-ops so observers implement only what they
/// render.
pub trait ListObserver<T> {
    /// Fired after every mutation attempt and every list reload.
    fn on_list_changed(&self, _records: &[T]) {}

    /// Fired when add/rename input is rejected.
    fn on_validation_error(&self, _kind: ValidationKind, _message: &str) {}
}

/// Capability shared by the category and item list screens.
///
/// Swipe and search plumbing (`ListController`) depends only on this trait.
pub trait RecordManager {
    type Record: Clone;

    /// Currently visible records.
    fn records(&self) -> &[Self::Record];
    /// Clears any search and reloads every record in label order.
    fn list_all(&mut self) -> Vec<Self::Record>;
    /// Filters by case-insensitive substring, oldest first.
    ///
    /// Blank `text` behaves like `list_all`.
    fn search(&mut self, text: &str) -> Vec<Self::Record>;
    fn add(&mut self, raw_label: &str) -> ManagerResult<Self::Record>;
    fn rename(&mut self, id: Uuid, raw_label: &str) -> ManagerResult<Self::Record>;
    fn delete(&mut self, id: Uuid) -> ManagerResult<()>;
    /// Row tap: categories are selected for navigation, items toggle done.
    fn activate(&mut self, row: usize) -> Option<Self::Record>;
    fn id_at(&self, row: usize) -> Option<Uuid>;
}

/// Stages one mutation and commits it, rolling back when staging fails.
pub(crate) fn persist<S, T>(store: &S, stage: impl FnOnce(&S) -> StoreResult<T>) -> StoreResult<T>
where
    S: PersistentStore,
{
    match stage(store) {
        Ok(value) => {
            store.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = store.rollback() {
                warn!("event=store_rollback module=manager status=error error={rollback_err}");
            }
            Err(err)
        }
    }
}

/// Trimmed search text, or `None` when the search box is effectively empty.
pub(crate) fn normalize_search(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ManagerError, ValidationKind};
    use crate::store::StoreError;
    use uuid::Uuid;

    #[test]
    fn validation_messages_name_the_entity() {
        assert_eq!(
            ValidationKind::SameName.message("Category"),
            "New Category name cannot be the same as the previous name."
        );
        assert_eq!(
            ValidationKind::EmptyInput.message("Item"),
            "TextField is empty! Please enter a valid text."
        );
    }

    #[test]
    fn store_not_found_maps_to_manager_not_found() {
        let id = Uuid::new_v4();
        let err = ManagerError::from(StoreError::NotFound(id));
        assert!(matches!(err, ManagerError::NotFound(found) if found == id));
        assert_eq!(err.validation_kind(), None);
    }
}
