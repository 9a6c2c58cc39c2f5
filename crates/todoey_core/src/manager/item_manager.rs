//! Item list manager scoped to one category.
//!
//! # Responsibility
//! - Own the visible item list of the selected category.
//! - Run list/search/add/rename/toggle-done/delete against a
//!   `PersistentStore`.
//!
//! # Invariants
//! - Every query and mutation is confined to the selected category; items of
//!   other categories are reported as not found.
//! - No two items of the category share a case-insensitive title.
//! - `toggle_done` exposes no store failure; it returns the item as stored.

use crate::manager::{
    normalize_search, persist, ListObserver, ManagerError, ManagerResult, RecordManager,
    ValidationKind,
};
use crate::model::category::{Category, CategoryId};
use crate::model::item::{Item, ItemId};
use crate::model::normalize_label;
use crate::store::{ItemQuery, PersistentStore, StoreError};
use log::{info, warn};
use std::time::Instant;

const ENTITY: &str = "Item";

/// Manager behind the item list screen of one category.
pub struct ItemManager<S: PersistentStore> {
    store: S,
    category: Category,
    items: Vec<Item>,
    active_search: Option<String>,
    observer: Option<Box<dyn ListObserver<Item>>>,
}

impl<S: PersistentStore> ItemManager<S> {
    /// Creates a manager for `category` and loads its items in title order.
    pub fn new(store: S, category: Category) -> Self {
        let mut manager = Self {
            store,
            category,
            items: Vec::new(),
            active_search: None,
            observer: None,
        };
        manager.reload();
        manager
    }

    /// Loads the category by id and creates a manager for it.
    pub fn open(store: S, category_id: CategoryId) -> ManagerResult<Self> {
        match store.find_category(category_id)? {
            Some(category) => Ok(Self::new(store, category)),
            None => Err(ManagerError::NotFound(category_id)),
        }
    }

    /// Attaches the presentation observer and pushes the current list to it.
    pub fn with_observer(mut self, observer: impl ListObserver<Item> + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self.notify_list_changed();
        self
    }

    /// Selected category.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Store used by this manager.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active search text, if the list is currently filtered.
    pub fn active_search(&self) -> Option<&str> {
        self.active_search.as_deref()
    }

    /// Flips `is_done` and persists it.
    ///
    /// Store failures are logged only; the returned item reflects what the
    /// store actually holds. Returns `None` when `id` is not an item of the
    /// selected category.
    pub fn toggle_done(&mut self, id: ItemId) -> Option<Item> {
        const EVENT: &str = "item_toggle_done";
        let started_at = Instant::now();

        let current = match self.find_scoped(id) {
            Ok(item) => item,
            Err(err) => {
                warn!("event={EVENT} module=manager status=error item_id={id} error={err}");
                self.reload();
                return None;
            }
        };

        let mut toggled = current.clone();
        toggled.toggle_done();
        match persist(&self.store, |store| store.update_item(&toggled)) {
            Ok(()) => info!(
                "event={EVENT} module=manager status=ok item_id={id} is_done={} duration_ms={}",
                toggled.is_done,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!("event={EVENT} module=manager status=error item_id={id} error={err}"),
        }
        self.reload();

        match self.store.find_item(id) {
            Ok(Some(item)) => Some(item),
            Ok(None) => None,
            Err(err) => {
                warn!("event={EVENT} module=manager status=error item_id={id} error={err}");
                Some(current)
            }
        }
    }

    fn find_scoped(&self, id: ItemId) -> Result<Item, StoreError> {
        match self.store.find_item(id)? {
            Some(item) if item.category_id == self.category.id => Ok(item),
            _ => Err(StoreError::NotFound(id)),
        }
    }

    fn current_query(&self) -> ItemQuery {
        match self.active_search.as_deref() {
            Some(text) => ItemQuery::search(self.category.id, text),
            None => ItemQuery::all(self.category.id),
        }
    }

    fn reload(&mut self) {
        match self.store.fetch_items(&self.current_query()) {
            Ok(items) => self.items = items,
            Err(err) => warn!(
                "event=item_load module=manager status=error category_id={} error_code=store_fetch_failed error={err}",
                self.category.id
            ),
        }
        self.notify_list_changed();
    }

    fn notify_list_changed(&self) {
        if let Some(observer) = self.observer.as_ref() {
            observer.on_list_changed(&self.items);
        }
    }

    fn reject(&self, event: &'static str, kind: ValidationKind) -> ManagerError {
        info!(
            "event={event} module=manager status=rejected category_id={} reason={kind}",
            self.category.id
        );
        if let Some(observer) = self.observer.as_ref() {
            observer.on_validation_error(kind, &kind.message(ENTITY));
        }
        self.notify_list_changed();
        ManagerError::Validation(kind)
    }

    fn store_failure(&mut self, event: &'static str, err: StoreError) -> ManagerError {
        warn!(
            "event={event} module=manager status=error category_id={} error={err}",
            self.category.id
        );
        self.reload();
        ManagerError::from(err)
    }

    fn ensure_unique(
        &mut self,
        event: &'static str,
        title: &str,
        exclude: Option<ItemId>,
    ) -> ManagerResult<()> {
        let query = ItemQuery::duplicates_of(self.category.id, title, exclude);
        match self.store.fetch_items(&query) {
            Ok(existing) if existing.is_empty() => Ok(()),
            Ok(_) => Err(self.reject(event, ValidationKind::DuplicateTitle)),
            Err(err) => Err(self.store_failure(event, err)),
        }
    }
}

impl<S: PersistentStore> RecordManager for ItemManager<S> {
    type Record = Item;

    fn records(&self) -> &[Item] {
        &self.items
    }

    fn list_all(&mut self) -> Vec<Item> {
        self.active_search = None;
        self.reload();
        self.items.clone()
    }

    fn search(&mut self, text: &str) -> Vec<Item> {
        self.active_search = normalize_search(text);
        self.reload();
        self.items.clone()
    }

    fn add(&mut self, raw_label: &str) -> ManagerResult<Item> {
        const EVENT: &str = "item_add";
        let started_at = Instant::now();

        let Some(title) = normalize_label(raw_label) else {
            return Err(self.reject(EVENT, ValidationKind::EmptyInput));
        };
        self.ensure_unique(EVENT, &title, None)?;

        let item = Item::new(self.category.id, title);
        if let Err(err) = persist(&self.store, |store| store.insert_item(&item)) {
            return Err(self.store_failure(EVENT, err));
        }

        info!(
            "event={EVENT} module=manager status=ok category_id={} item_id={} duration_ms={}",
            self.category.id,
            item.id,
            started_at.elapsed().as_millis()
        );
        self.reload();
        Ok(item)
    }

    fn rename(&mut self, id: ItemId, raw_label: &str) -> ManagerResult<Item> {
        const EVENT: &str = "item_rename";
        let started_at = Instant::now();

        let Some(title) = normalize_label(raw_label) else {
            return Err(self.reject(EVENT, ValidationKind::EmptyInput));
        };
        let current = match self.find_scoped(id) {
            Ok(item) => item,
            Err(err) => return Err(self.store_failure(EVENT, err)),
        };
        if current.title == title {
            return Err(self.reject(EVENT, ValidationKind::SameName));
        }
        self.ensure_unique(EVENT, &title, Some(id))?;

        let renamed = Item { title, ..current };
        if let Err(err) = persist(&self.store, |store| store.update_item(&renamed)) {
            return Err(self.store_failure(EVENT, err));
        }

        info!(
            "event={EVENT} module=manager status=ok item_id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        self.reload();
        Ok(renamed)
    }

    fn delete(&mut self, id: ItemId) -> ManagerResult<()> {
        const EVENT: &str = "item_delete";
        let started_at = Instant::now();

        if let Err(err) = self.find_scoped(id) {
            return Err(self.store_failure(EVENT, err));
        }
        if let Err(err) = persist(&self.store, |store| store.remove_item(id)) {
            return Err(self.store_failure(EVENT, err));
        }

        info!(
            "event={EVENT} module=manager status=ok item_id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        self.reload();
        Ok(())
    }

    fn activate(&mut self, row: usize) -> Option<Item> {
        let id = self.id_at(row)?;
        self.toggle_done(id)
    }

    fn id_at(&self, row: usize) -> Option<ItemId> {
        self.items.get(row).map(|item| item.id)
    }
}
