mod common;

use common::{category_names, FlakyStore, RecordingObserver};
use todoey_core::db::open_db_in_memory;
use todoey_core::{
    CategoryManager, ItemManager, ManagerError, PersistentStore, RecordManager, SqliteStore,
    StoreError, ValidationKind,
};

fn manager(conn: &rusqlite::Connection) -> CategoryManager<SqliteStore<'_>> {
    CategoryManager::new(SqliteStore::try_new(conn).unwrap())
}

#[test]
fn list_all_sorts_by_name_with_uppercase_first() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);

    categories.add("Work").unwrap();
    categories.add("groceries").unwrap();
    categories.add("Errands").unwrap();

    let listed = categories.list_all();
    assert_eq!(category_names(&listed), vec!["Errands", "Work", "groceries"]);
}

#[test]
fn add_trims_input_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);

    let created = categories.add("   Home  ").unwrap();
    assert_eq!(created.name, "Home");

    let reopened = manager(&conn);
    assert_eq!(category_names(reopened.records()), vec!["Home"]);
}

#[test]
fn add_rejects_blank_input_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);

    for raw in ["", "   ", "\t \n"] {
        let err = categories.add(raw).unwrap_err();
        assert_eq!(err.validation_kind(), Some(ValidationKind::EmptyInput));
    }
    assert!(categories.list_all().is_empty());
}

#[test]
fn add_rejects_case_insensitive_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    categories.add("Groceries").unwrap();
    categories.add("Work").unwrap();

    let err = categories.add("groceries").unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::DuplicateName));
    let err = categories.add("  WORK ").unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::DuplicateName));
    assert_eq!(categories.list_all().len(), 2);
}

#[test]
fn duplicate_check_is_exact_match_not_substring() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    categories.add("Work").unwrap();

    // "Work" is a substring of both, but neither is an exact match.
    categories.add("Homework").unwrap();
    categories.add("Work trips").unwrap();

    assert_eq!(categories.search("work").len(), 3);
    assert_eq!(categories.list_all().len(), 3);
}

#[test]
fn added_category_appears_once_and_only_in_matching_searches() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    categories.add("Work").unwrap();
    let created = categories.add("Garden").unwrap();

    let all = categories.list_all();
    assert_eq!(all.iter().filter(|c| c.id == created.id).count(), 1);

    let unrelated = categories.search("wor");
    assert!(unrelated.iter().all(|c| c.id != created.id));
}

#[test]
fn search_matches_substring_case_insensitively_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    categories.add("Work").unwrap();
    categories.add("Groceries").unwrap();
    categories.add("Homework").unwrap();

    let hits = categories.search("  WORK ");
    assert_eq!(category_names(&hits), vec!["Work", "Homework"]);
    assert_eq!(categories.active_search(), Some("WORK"));
}

#[test]
fn search_with_blank_text_lists_everything() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    categories.add("Work").unwrap();
    categories.add("Groceries").unwrap();

    let searched = categories.search("   ");
    let listed = categories.list_all();
    assert_eq!(searched, listed);
    assert_eq!(category_names(&listed), vec!["Groceries", "Work"]);
    assert_eq!(categories.active_search(), None);
}

#[test]
fn search_treats_sql_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    categories.add("100% done").unwrap();
    categories.add("Work").unwrap();

    assert_eq!(category_names(&categories.search("%")), vec!["100% done"]);
    assert!(categories.search("_").is_empty());
}

#[test]
fn mutations_keep_active_search_applied() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    categories.add("Work").unwrap();
    categories.search("wor");

    categories.add("Garden").unwrap();
    assert_eq!(category_names(categories.records()), vec!["Work"]);
    assert_eq!(categories.list_all().len(), 2);
}

#[test]
fn rename_updates_name() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    let work = categories.add("Work").unwrap();

    let renamed = categories.rename(work.id, " Office ").unwrap();
    assert_eq!(renamed.id, work.id);
    assert_eq!(renamed.name, "Office");
    assert_eq!(renamed.created_at, work.created_at);
    assert_eq!(category_names(categories.records()), vec!["Office"]);
}

#[test]
fn rename_to_identical_name_is_same_name_error() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    let work = categories.add("Work").unwrap();

    let err = categories.rename(work.id, "Work").unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::SameName));
    let err = categories.rename(work.id, "  Work ").unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::SameName));
}

#[test]
fn rename_changing_only_case_is_allowed() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    let work = categories.add("work").unwrap();

    let renamed = categories.rename(work.id, "Work").unwrap();
    assert_eq!(renamed.name, "Work");
}

#[test]
fn rename_rejects_blank_and_duplicate_names() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    let work = categories.add("Work").unwrap();
    categories.add("Home").unwrap();

    let err = categories.rename(work.id, "  ").unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::EmptyInput));
    let err = categories.rename(work.id, "HOME").unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::DuplicateName));
    assert_eq!(category_names(&categories.list_all()), vec!["Home", "Work"]);
}

#[test]
fn rename_unknown_category_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    let missing = uuid::Uuid::new_v4();

    let err = categories.rename(missing, "Anything").unwrap_err();
    assert!(matches!(err, ManagerError::NotFound(id) if id == missing));
}

#[test]
fn delete_removes_category() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    let work = categories.add("Work").unwrap();
    categories.add("Home").unwrap();

    categories.delete(work.id).unwrap();
    assert_eq!(category_names(&categories.list_all()), vec!["Home"]);

    let err = categories.delete(work.id).unwrap_err();
    assert!(matches!(err, ManagerError::NotFound(id) if id == work.id));
}

#[test]
fn delete_with_items_succeeds_and_cascades() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = manager(&conn);
    let work = categories.add("Work").unwrap();
    {
        let mut items = ItemManager::new(SqliteStore::try_new(&conn).unwrap(), work.clone());
        items.add("Buy milk").unwrap();
        items.add("Call mom").unwrap();
    }

    categories.delete(work.id).unwrap();

    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM items WHERE category_uuid = ?1;",
            [work.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn observer_receives_list_changes_and_validation_errors() {
    let conn = open_db_in_memory().unwrap();
    let observer = RecordingObserver::default();
    let mut categories =
        CategoryManager::new(SqliteStore::try_new(&conn).unwrap()).with_observer(observer.clone());

    categories.add("Work").unwrap();
    categories.add("work").unwrap_err();

    let errors = observer.validation_errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, ValidationKind::DuplicateName);
    assert_eq!(errors[0].1, "A Category with this name already exists.");

    // attach, add, rejected add
    assert_eq!(*observer.list_sizes.borrow(), vec![0, 1, 1]);
}

#[test]
fn failed_commit_is_reported_and_list_reflects_store() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = CategoryManager::new(FlakyStore::new(&conn));
    categories.add("Work").unwrap();

    categories.store().fail_commit.set(true);
    let err = categories.add("Home").unwrap_err();
    assert!(matches!(err, ManagerError::Store(StoreError::Commit(_))));
    assert_eq!(category_names(categories.records()), vec!["Work"]);

    categories.store().fail_commit.set(false);
    assert_eq!(category_names(&categories.list_all()), vec!["Work"]);
    assert!(categories.store().find_category(categories.records()[0].id).unwrap().is_some());
}

#[test]
fn failed_delete_keeps_category() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = CategoryManager::new(FlakyStore::new(&conn));
    let work = categories.add("Work").unwrap();

    categories.store().fail_commit.set(true);
    let err = categories.delete(work.id).unwrap_err();
    assert!(matches!(err, ManagerError::Store(StoreError::Commit(_))));
    assert_eq!(category_names(categories.records()), vec!["Work"]);
}

#[test]
fn fetch_failure_keeps_previous_list() {
    let conn = open_db_in_memory().unwrap();
    let mut categories = CategoryManager::new(FlakyStore::new(&conn));
    categories.add("Work").unwrap();

    categories.store().fail_fetch.set(true);
    assert_eq!(category_names(&categories.search("x")), vec!["Work"]);

    let err = categories.add("Home").unwrap_err();
    assert!(matches!(err, ManagerError::Store(StoreError::Fetch(_))));
}
