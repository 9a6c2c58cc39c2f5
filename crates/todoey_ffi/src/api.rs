//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the category and item list screens as sync calls.
//! - Return the refreshed list with every response, so the UI always
//!   reloads from one envelope.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Validation failures carry a stable `error_kind` code and the dialog text.

use log::warn;
use todoey_core::db::open_db;
use todoey_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Category, CategoryManager, Item, ItemManager, ManagerError, ManagerResult, RecordManager,
    SqliteStore,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "todoey.sqlite3";
const DB_PATH_ENV: &str = "TODOEY_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Category row as rendered by the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl From<&Category> for CategoryView {
    fn from(value: &Category) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            created_at: value.created_at,
        }
    }
}

/// Item row as rendered by the list screen (checkmark when `is_done`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: String,
    pub category_id: String,
    pub title: String,
    pub created_at: i64,
    pub is_done: bool,
}

impl From<&Item> for ItemView {
    fn from(value: &Item) -> Self {
        Self {
            id: value.id.to_string(),
            category_id: value.category_id.to_string(),
            title: value.title.clone(),
            created_at: value.created_at,
            is_done: value.is_done,
        }
    }
}

/// Response envelope for category screen calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListResponse {
    /// Whether the requested operation succeeded.
    pub ok: bool,
    /// `empty_input|same_name|duplicate_name` for validation failures.
    pub error_kind: Option<String>,
    /// Human-readable message; dialog text for validation failures.
    pub message: String,
    /// Refreshed list, honoring the search text sent with the call.
    pub categories: Vec<CategoryView>,
}

/// Response envelope for item screen calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemListResponse {
    pub ok: bool,
    /// `empty_input|same_name|duplicate_title` for validation failures.
    pub error_kind: Option<String>,
    pub message: String,
    /// Selected category name, used as the screen title.
    pub category_name: Option<String>,
    pub items: Vec<ItemView>,
}

impl ItemListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_kind: None,
            message: message.into(),
            category_name: None,
            items: Vec::new(),
        }
    }
}

/// Lists categories, filtered when `search` is non-blank.
#[flutter_rust_bridge::frb(sync)]
pub fn category_list(search: Option<String>) -> CategoryListResponse {
    run_category_call("category_list", search, |_| Ok("Loaded."))
}

/// Adds a category from the add prompt text.
#[flutter_rust_bridge::frb(sync)]
pub fn category_add(name: String, search: Option<String>) -> CategoryListResponse {
    run_category_call("category_add", search, |manager| {
        manager.add(&name).map(|_| "Category added.")
    })
}

/// Renames a category from the update prompt text.
#[flutter_rust_bridge::frb(sync)]
pub fn category_rename(
    category_id: String,
    name: String,
    search: Option<String>,
) -> CategoryListResponse {
    run_category_call("category_rename", search, |manager| {
        let id = parse_id(&category_id)?;
        manager.rename(id, &name).map(|_| "Category updated.")
    })
}

/// Deletes a category together with its items.
#[flutter_rust_bridge::frb(sync)]
pub fn category_delete(category_id: String, search: Option<String>) -> CategoryListResponse {
    run_category_call("category_delete", search, |manager| {
        let id = parse_id(&category_id)?;
        manager.delete(id).map(|()| "Category deleted.")
    })
}

/// Lists items of a category, filtered when `search` is non-blank.
#[flutter_rust_bridge::frb(sync)]
pub fn item_list(category_id: String, search: Option<String>) -> ItemListResponse {
    run_item_call("item_list", &category_id, search, |_| Ok("Loaded."))
}

/// Adds an item to a category.
#[flutter_rust_bridge::frb(sync)]
pub fn item_add(category_id: String, title: String, search: Option<String>) -> ItemListResponse {
    run_item_call("item_add", &category_id, search, |manager| {
        manager.add(&title).map(|_| "Item added.")
    })
}

/// Renames an item within its category.
#[flutter_rust_bridge::frb(sync)]
pub fn item_rename(
    category_id: String,
    item_id: String,
    title: String,
    search: Option<String>,
) -> ItemListResponse {
    run_item_call("item_rename", &category_id, search, |manager| {
        let id = parse_id(&item_id)?;
        manager.rename(id, &title).map(|_| "Item updated.")
    })
}

/// Flips the done checkmark of an item. Store failures are not reported.
#[flutter_rust_bridge::frb(sync)]
pub fn item_toggle_done(
    category_id: String,
    item_id: String,
    search: Option<String>,
) -> ItemListResponse {
    run_item_call("item_toggle_done", &category_id, search, |manager| {
        let id = parse_id(&item_id)?;
        match manager.toggle_done(id) {
            Some(_) => Ok("Item toggled."),
            None => Err(ManagerError::NotFound(id)),
        }
    })
}

/// Deletes an item.
#[flutter_rust_bridge::frb(sync)]
pub fn item_delete(category_id: String, item_id: String, search: Option<String>) -> ItemListResponse {
    run_item_call("item_delete", &category_id, search, |manager| {
        let id = parse_id(&item_id)?;
        manager.delete(id).map(|()| "Item deleted.")
    })
}

fn run_category_call(
    call: &'static str,
    search: Option<String>,
    f: impl FnOnce(&mut CategoryManager<SqliteStore<'_>>) -> ManagerResult<&'static str>,
) -> CategoryListResponse {
    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return category_failure(format!("{call} failed: {err}")),
    };
    let store = match SqliteStore::try_new(&conn) {
        Ok(store) => store,
        Err(err) => return category_failure(format!("{call} failed: {err}")),
    };

    let mut manager = CategoryManager::new(store);
    if let Some(text) = search.as_deref() {
        manager.search(text);
    }
    let result = f(&mut manager);
    let categories = manager.records().iter().map(CategoryView::from).collect();
    match result {
        Ok(message) => CategoryListResponse {
            ok: true,
            error_kind: None,
            message: message.to_string(),
            categories,
        },
        Err(err) => {
            let (error_kind, message) = describe_error(call, "Category", &err);
            CategoryListResponse {
                ok: false,
                error_kind,
                message,
                categories,
            }
        }
    }
}

fn run_item_call(
    call: &'static str,
    category_id: &str,
    search: Option<String>,
    f: impl FnOnce(&mut ItemManager<SqliteStore<'_>>) -> ManagerResult<&'static str>,
) -> ItemListResponse {
    let category_id = match Uuid::parse_str(category_id.trim()) {
        Ok(id) => id,
        Err(_) => return ItemListResponse::failure(format!("{call} failed: invalid category id")),
    };
    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return ItemListResponse::failure(format!("{call} failed: {err}")),
    };
    let store = match SqliteStore::try_new(&conn) {
        Ok(store) => store,
        Err(err) => return ItemListResponse::failure(format!("{call} failed: {err}")),
    };
    let mut manager = match ItemManager::open(store, category_id) {
        Ok(manager) => manager,
        Err(err) => return ItemListResponse::failure(format!("{call} failed: {err}")),
    };

    if let Some(text) = search.as_deref() {
        manager.search(text);
    }
    let result = f(&mut manager);
    let category_name = Some(manager.category().name.clone());
    let items = manager.records().iter().map(ItemView::from).collect();
    match result {
        Ok(message) => ItemListResponse {
            ok: true,
            error_kind: None,
            message: message.to_string(),
            category_name,
            items,
        },
        Err(err) => {
            let (error_kind, message) = describe_error(call, "Item", &err);
            ItemListResponse {
                ok: false,
                error_kind,
                message,
                category_name,
                items,
            }
        }
    }
}

fn category_failure(message: String) -> CategoryListResponse {
    CategoryListResponse {
        ok: false,
        error_kind: None,
        message,
        categories: Vec::new(),
    }
}

fn describe_error(call: &str, entity: &str, err: &ManagerError) -> (Option<String>, String) {
    match err.validation_kind() {
        Some(kind) => (Some(kind.code().to_string()), kind.message(entity)),
        None => {
            warn!("event={call} module=ffi status=error error={err}");
            (None, format!("{call} failed: {err}"))
        }
    }
}

fn parse_id(value: &str) -> ManagerResult<Uuid> {
    // Unparseable ids cannot name a stored record.
    Uuid::parse_str(value.trim()).map_err(|_| ManagerError::NotFound(Uuid::nil()))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}
