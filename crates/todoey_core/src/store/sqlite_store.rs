//! SQLite-backed `PersistentStore`.
//!
//! # Responsibility
//! - Translate typed category/item queries into SQL.
//! - Stage mutations in one open transaction until `commit()`.
//!
//! # Invariants
//! - Label matching runs on the folded `*_key` columns, never on raw labels.
//! - Sort order is deterministic: ties fall back to insertion order.
//! - Label order is case-sensitive (`Work` before `groceries`).
//! - Removing a category removes its items in the same transaction.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::category::{Category, CategoryId};
use crate::model::fold_label;
use crate::model::item::{Item, ItemId};
use crate::store::{
    CategoryQuery, ItemQuery, LabelFilter, PersistentStore, SortKey, StoreError, StoreResult,
};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const CATEGORY_SELECT_SQL: &str = "SELECT uuid, name, created_at FROM categories";
const ITEM_SELECT_SQL: &str =
    "SELECT uuid, category_uuid, title, created_at, is_done FROM items";

/// SQLite store bound to one migrated connection.
///
/// Several stores may share a connection; they then share its pending
/// transaction as well.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// Rejects connections whose schema was not migrated by this binary.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))
            .map_err(fetch_error)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn begin_if_needed(&self) -> StoreResult<()> {
        if self.conn.is_autocommit() {
            self.conn
                .execute_batch("BEGIN IMMEDIATE;")
                .map_err(write_error)?;
            debug!("event=store_begin module=store status=ok");
        }
        Ok(())
    }
}

impl PersistentStore for SqliteStore<'_> {
    fn fetch_categories(&self, query: &CategoryQuery) -> StoreResult<Vec<Category>> {
        let mut sql = format!("{CATEGORY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        push_label_filter(&mut sql, &mut bind_values, "name_key", query.filter.as_ref());
        if let Some(exclude) = query.exclude {
            sql.push_str(" AND uuid <> ?");
            bind_values.push(Value::Text(exclude.to_string()));
        }
        push_order_by(&mut sql, "name", query.sort, query.ascending);

        let mut stmt = self.conn.prepare(&sql).map_err(fetch_error)?;
        let mut rows = stmt
            .query(params_from_iter(bind_values))
            .map_err(fetch_error)?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next().map_err(fetch_error)? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn find_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE uuid = ?1;"))
            .map_err(fetch_error)?;
        let mut rows = stmt.query([id.to_string()]).map_err(fetch_error)?;
        match rows.next().map_err(fetch_error)? {
            Some(row) => Ok(Some(parse_category_row(row)?)),
            None => Ok(None),
        }
    }

    fn insert_category(&self, category: &Category) -> StoreResult<()> {
        category.validate()?;
        self.begin_if_needed()?;
        self.conn
            .execute(
                "INSERT INTO categories (uuid, name, name_key, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    category.id.to_string(),
                    category.name.as_str(),
                    fold_label(&category.name),
                    category.created_at,
                ],
            )
            .map_err(write_error)?;
        Ok(())
    }

    fn update_category(&self, category: &Category) -> StoreResult<()> {
        category.validate()?;
        self.begin_if_needed()?;
        let changed = self
            .conn
            .execute(
                "UPDATE categories
                 SET name = ?2, name_key = ?3
                 WHERE uuid = ?1;",
                params![
                    category.id.to_string(),
                    category.name.as_str(),
                    fold_label(&category.name),
                ],
            )
            .map_err(write_error)?;
        if changed == 0 {
            return Err(StoreError::NotFound(category.id));
        }
        Ok(())
    }

    fn remove_category(&self, id: CategoryId) -> StoreResult<usize> {
        self.begin_if_needed()?;
        let uuid = id.to_string();
        let removed_items = self
            .conn
            .execute("DELETE FROM items WHERE category_uuid = ?1;", [uuid.as_str()])
            .map_err(write_error)?;
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE uuid = ?1;", [uuid.as_str()])
            .map_err(write_error)?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(removed_items)
    }

    fn fetch_items(&self, query: &ItemQuery) -> StoreResult<Vec<Item>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE category_uuid = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.category_id.to_string())];

        push_label_filter(&mut sql, &mut bind_values, "title_key", query.filter.as_ref());
        if let Some(exclude) = query.exclude {
            sql.push_str(" AND uuid <> ?");
            bind_values.push(Value::Text(exclude.to_string()));
        }
        push_order_by(&mut sql, "title", query.sort, query.ascending);

        let mut stmt = self.conn.prepare(&sql).map_err(fetch_error)?;
        let mut rows = stmt
            .query(params_from_iter(bind_values))
            .map_err(fetch_error)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().map_err(fetch_error)? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn find_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))
            .map_err(fetch_error)?;
        let mut rows = stmt.query([id.to_string()]).map_err(fetch_error)?;
        match rows.next().map_err(fetch_error)? {
            Some(row) => Ok(Some(parse_item_row(row)?)),
            None => Ok(None),
        }
    }

    fn insert_item(&self, item: &Item) -> StoreResult<()> {
        item.validate()?;
        self.begin_if_needed()?;
        self.conn
            .execute(
                "INSERT INTO items (uuid, category_uuid, title, title_key, created_at, is_done)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    item.id.to_string(),
                    item.category_id.to_string(),
                    item.title.as_str(),
                    fold_label(&item.title),
                    item.created_at,
                    bool_to_int(item.is_done),
                ],
            )
            .map_err(write_error)?;
        Ok(())
    }

    fn update_item(&self, item: &Item) -> StoreResult<()> {
        item.validate()?;
        self.begin_if_needed()?;
        let changed = self
            .conn
            .execute(
                "UPDATE items
                 SET title = ?2, title_key = ?3, is_done = ?4
                 WHERE uuid = ?1;",
                params![
                    item.id.to_string(),
                    item.title.as_str(),
                    fold_label(&item.title),
                    bool_to_int(item.is_done),
                ],
            )
            .map_err(write_error)?;
        if changed == 0 {
            return Err(StoreError::NotFound(item.id));
        }
        Ok(())
    }

    fn remove_item(&self, id: ItemId) -> StoreResult<()> {
        self.begin_if_needed()?;
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE uuid = ?1;", [id.to_string()])
            .map_err(write_error)?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn commit(&self) -> StoreResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        if let Err(err) = self.conn.execute_batch("COMMIT;") {
            if !self.conn.is_autocommit() {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK;") {
                    warn!(
                        "event=store_rollback module=store status=error error={rollback_err}"
                    );
                }
            }
            return Err(StoreError::Commit(DbError::Sqlite(err)));
        }
        debug!("event=store_commit module=store status=ok");
        Ok(())
    }

    fn rollback(&self) -> StoreResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn
            .execute_batch("ROLLBACK;")
            .map_err(write_error)?;
        debug!("event=store_rollback module=store status=ok");
        Ok(())
    }
}

fn push_label_filter(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    key_column: &str,
    filter: Option<&LabelFilter>,
) {
    match filter {
        Some(LabelFilter::Exact(label)) => {
            sql.push_str(&format!(" AND {key_column} = ?"));
            bind_values.push(Value::Text(fold_label(label.trim())));
        }
        // instr() instead of LIKE so `%` and `_` in user text match literally.
        Some(LabelFilter::Contains(text)) => {
            sql.push_str(&format!(" AND instr({key_column}, ?) > 0"));
            bind_values.push(Value::Text(fold_label(text.trim())));
        }
        None => {}
    }
}

// Label order compares raw labels with BINARY collation, so uppercase sorts
// before lowercase; folded keys are for matching only.
fn push_order_by(sql: &mut String, label_column: &str, sort: SortKey, ascending: bool) {
    let direction = if ascending { "ASC" } else { "DESC" };
    let column = match sort {
        SortKey::Label => label_column,
        SortKey::CreatedAt => "created_at",
    };
    sql.push_str(&format!(" ORDER BY {column} {direction}, rowid {direction};"));
}

fn parse_category_row(row: &Row<'_>) -> StoreResult<Category> {
    let uuid_text: String = row.get("uuid").map_err(fetch_error)?;
    let category = Category {
        id: parse_uuid(&uuid_text, "categories.uuid")?,
        name: row.get("name").map_err(fetch_error)?,
        created_at: row.get("created_at").map_err(fetch_error)?,
    };
    category.validate()?;
    Ok(category)
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<Item> {
    let uuid_text: String = row.get("uuid").map_err(fetch_error)?;
    let category_text: String = row.get("category_uuid").map_err(fetch_error)?;
    let is_done = match row.get::<_, i64>("is_done").map_err(fetch_error)? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_done value `{other}` in items.is_done"
            )));
        }
    };

    let item = Item {
        id: parse_uuid(&uuid_text, "items.uuid")?,
        category_id: parse_uuid(&category_text, "items.category_uuid")?,
        title: row.get("title").map_err(fetch_error)?,
        created_at: row.get("created_at").map_err(fetch_error)?,
        is_done,
    };
    item.validate()?;
    Ok(item)
}

fn parse_uuid(value: &str, column: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn fetch_error(err: rusqlite::Error) -> StoreError {
    StoreError::Fetch(DbError::Sqlite(err))
}

fn write_error(err: rusqlite::Error) -> StoreError {
    StoreError::Write(DbError::Sqlite(err))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::push_order_by;
    use crate::store::SortKey;

    #[test]
    fn order_by_label_breaks_ties_by_insertion_order() {
        let mut sql = String::new();
        push_order_by(&mut sql, "name", SortKey::Label, true);
        assert_eq!(sql, " ORDER BY name ASC, rowid ASC;");
    }

    #[test]
    fn order_by_created_at_descending() {
        let mut sql = String::new();
        push_order_by(&mut sql, "title", SortKey::CreatedAt, false);
        assert_eq!(sql, " ORDER BY created_at DESC, rowid DESC;");
    }
}
