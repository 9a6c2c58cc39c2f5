//! Category list manager.
//!
//! # Responsibility
//! - Own the visible category list (name order, or creation order while a
//!   search is active).
//! - Run list/search/add/rename/delete against a `PersistentStore`.
//!
//! # Invariants
//! - No two categories share a case-insensitive name.
//! - Deleting a category deletes its items in the same commit.

use crate::manager::{
    normalize_search, persist, ListObserver, ManagerError, ManagerResult, RecordManager,
    ValidationKind,
};
use crate::model::category::{Category, CategoryId};
use crate::model::normalize_label;
use crate::store::{CategoryQuery, PersistentStore, StoreError};
use log::{info, warn};
use std::time::Instant;

const ENTITY: &str = "Category";

/// Manager behind the category list screen.
pub struct CategoryManager<S: PersistentStore> {
    store: S,
    categories: Vec<Category>,
    active_search: Option<String>,
    observer: Option<Box<dyn ListObserver<Category>>>,
}

impl<S: PersistentStore> CategoryManager<S> {
    /// Creates a manager and loads every category in name order.
    pub fn new(store: S) -> Self {
        let mut manager = Self {
            store,
            categories: Vec::new(),
            active_search: None,
            observer: None,
        };
        manager.reload();
        manager
    }

    /// Attaches the presentation observer and pushes the current list to it.
    pub fn with_observer(mut self, observer: impl ListObserver<Category> + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self.notify_list_changed();
        self
    }

    /// Store used by this manager.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active search text, if the list is currently filtered.
    pub fn active_search(&self) -> Option<&str> {
        self.active_search.as_deref()
    }

    fn current_query(&self) -> CategoryQuery {
        match self.active_search.as_deref() {
            Some(text) => CategoryQuery::search(text),
            None => CategoryQuery::all(),
        }
    }

    fn reload(&mut self) {
        match self.store.fetch_categories(&self.current_query()) {
            Ok(categories) => self.categories = categories,
            Err(err) => warn!(
                "event=category_load module=manager status=error error_code=store_fetch_failed error={err}"
            ),
        }
        self.notify_list_changed();
    }

    fn notify_list_changed(&self) {
        if let Some(observer) = self.observer.as_ref() {
            observer.on_list_changed(&self.categories);
        }
    }

    fn reject(&self, event: &'static str, kind: ValidationKind) -> ManagerError {
        info!("event={event} module=manager status=rejected reason={kind}");
        if let Some(observer) = self.observer.as_ref() {
            observer.on_validation_error(kind, &kind.message(ENTITY));
        }
        self.notify_list_changed();
        ManagerError::Validation(kind)
    }

    fn store_failure(&mut self, event: &'static str, err: StoreError) -> ManagerError {
        warn!("event={event} module=manager status=error error={err}");
        self.reload();
        ManagerError::from(err)
    }

    fn ensure_unique(
        &mut self,
        event: &'static str,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> ManagerResult<()> {
        match self
            .store
            .fetch_categories(&CategoryQuery::duplicates_of(name, exclude))
        {
            Ok(existing) if existing.is_empty() => Ok(()),
            Ok(_) => Err(self.reject(event, ValidationKind::DuplicateName)),
            Err(err) => Err(self.store_failure(event, err)),
        }
    }
}

impl<S: PersistentStore> RecordManager for CategoryManager<S> {
    type Record = Category;

    fn records(&self) -> &[Category] {
        &self.categories
    }

    fn list_all(&mut self) -> Vec<Category> {
        self.active_search = None;
        self.reload();
        self.categories.clone()
    }

    fn search(&mut self, text: &str) -> Vec<Category> {
        self.active_search = normalize_search(text);
        self.reload();
        self.categories.clone()
    }

    fn add(&mut self, raw_label: &str) -> ManagerResult<Category> {
        const EVENT: &str = "category_add";
        let started_at = Instant::now();

        let Some(name) = normalize_label(raw_label) else {
            return Err(self.reject(EVENT, ValidationKind::EmptyInput));
        };
        self.ensure_unique(EVENT, &name, None)?;

        let category = Category::new(name);
        if let Err(err) = persist(&self.store, |store| store.insert_category(&category)) {
            return Err(self.store_failure(EVENT, err));
        }

        info!(
            "event={EVENT} module=manager status=ok category_id={} duration_ms={}",
            category.id,
            started_at.elapsed().as_millis()
        );
        self.reload();
        Ok(category)
    }

    fn rename(&mut self, id: CategoryId, raw_label: &str) -> ManagerResult<Category> {
        const EVENT: &str = "category_rename";
        let started_at = Instant::now();

        let Some(name) = normalize_label(raw_label) else {
            return Err(self.reject(EVENT, ValidationKind::EmptyInput));
        };
        let current = match self.store.find_category(id) {
            Ok(Some(category)) => category,
            Ok(None) => return Err(self.store_failure(EVENT, StoreError::NotFound(id))),
            Err(err) => return Err(self.store_failure(EVENT, err)),
        };
        if current.name == name {
            return Err(self.reject(EVENT, ValidationKind::SameName));
        }
        self.ensure_unique(EVENT, &name, Some(id))?;

        let renamed = Category { name, ..current };
        if let Err(err) = persist(&self.store, |store| store.update_category(&renamed)) {
            return Err(self.store_failure(EVENT, err));
        }

        info!(
            "event={EVENT} module=manager status=ok category_id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        self.reload();
        Ok(renamed)
    }

    fn delete(&mut self, id: CategoryId) -> ManagerResult<()> {
        const EVENT: &str = "category_delete";
        let started_at = Instant::now();

        match persist(&self.store, |store| store.remove_category(id)) {
            Ok(removed_items) => {
                info!(
                    "event={EVENT} module=manager status=ok category_id={id} removed_items={removed_items} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                self.reload();
                Ok(())
            }
            Err(err) => Err(self.store_failure(EVENT, err)),
        }
    }

    fn activate(&mut self, row: usize) -> Option<Category> {
        self.categories.get(row).cloned()
    }

    fn id_at(&self, row: usize) -> Option<CategoryId> {
        self.categories.get(row).map(|category| category.id)
    }
}
