#![allow(dead_code)]

use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use todoey_core::db::DbError;
use todoey_core::{
    Category, CategoryId, CategoryQuery, Item, ItemId, ItemQuery, ListObserver, PersistentStore,
    SqliteStore, StoreError, StoreResult, ValidationKind,
};

/// SQLite store whose fetch/commit can be switched to fail.
pub struct FlakyStore<'conn> {
    inner: SqliteStore<'conn>,
    pub fail_fetch: Cell<bool>,
    pub fail_commit: Cell<bool>,
    pub commits: Cell<usize>,
}

impl<'conn> FlakyStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            inner: SqliteStore::try_new(conn).unwrap(),
            fail_fetch: Cell::new(false),
            fail_commit: Cell::new(false),
            commits: Cell::new(0),
        }
    }

    fn check_fetch(&self) -> StoreResult<()> {
        if self.fail_fetch.get() {
            return Err(StoreError::Fetch(DbError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )));
        }
        Ok(())
    }
}

impl PersistentStore for FlakyStore<'_> {
    fn fetch_categories(&self, query: &CategoryQuery) -> StoreResult<Vec<Category>> {
        self.check_fetch()?;
        self.inner.fetch_categories(query)
    }

    fn find_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        self.check_fetch()?;
        self.inner.find_category(id)
    }

    fn insert_category(&self, category: &Category) -> StoreResult<()> {
        self.inner.insert_category(category)
    }

    fn update_category(&self, category: &Category) -> StoreResult<()> {
        self.inner.update_category(category)
    }

    fn remove_category(&self, id: CategoryId) -> StoreResult<usize> {
        self.inner.remove_category(id)
    }

    fn fetch_items(&self, query: &ItemQuery) -> StoreResult<Vec<Item>> {
        self.check_fetch()?;
        self.inner.fetch_items(query)
    }

    fn find_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        self.check_fetch()?;
        self.inner.find_item(id)
    }

    fn insert_item(&self, item: &Item) -> StoreResult<()> {
        self.inner.insert_item(item)
    }

    fn update_item(&self, item: &Item) -> StoreResult<()> {
        self.inner.update_item(item)
    }

    fn remove_item(&self, id: ItemId) -> StoreResult<()> {
        self.inner.remove_item(id)
    }

    fn commit(&self) -> StoreResult<()> {
        if self.fail_commit.get() {
            self.inner.rollback()?;
            return Err(StoreError::Commit(DbError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )));
        }
        self.inner.commit()?;
        self.commits.set(self.commits.get() + 1);
        Ok(())
    }

    fn rollback(&self) -> StoreResult<()> {
        self.inner.rollback()
    }
}

/// Observer that records every callback.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub list_sizes: Rc<RefCell<Vec<usize>>>,
    pub validation_errors: Rc<RefCell<Vec<(ValidationKind, String)>>>,
}

impl<T> ListObserver<T> for RecordingObserver {
    fn on_list_changed(&self, records: &[T]) {
        self.list_sizes.borrow_mut().push(records.len());
    }

    fn on_validation_error(&self, kind: ValidationKind, message: &str) {
        self.validation_errors
            .borrow_mut()
            .push((kind, message.to_string()));
    }
}

pub fn category_names(categories: &[Category]) -> Vec<&str> {
    categories.iter().map(|category| category.name.as_str()).collect()
}

pub fn item_titles(items: &[Item]) -> Vec<&str> {
    items.iter().map(|item| item.title.as_str()).collect()
}
