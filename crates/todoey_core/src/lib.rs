//! Core logic for the Todoey to-do list.
//! Categories group items; both lists are managed over a local SQLite store.

pub mod db;
pub mod logging;
pub mod manager;
pub mod model;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use manager::{
    ActionOutcome, CategoryManager, ItemManager, ListController, ListObserver, ManagerError,
    ManagerResult, RecordManager, RowAction, SearchOutcome, ValidationKind,
};
pub use model::category::{Category, CategoryId};
pub use model::item::{Item, ItemId};
pub use model::{fold_label, normalize_label, RecordValidationError};
pub use store::{
    CategoryQuery, ItemQuery, LabelFilter, PersistentStore, SortKey, SqliteStore, StoreError,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
