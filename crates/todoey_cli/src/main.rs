//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todoey_core` linkage.
//! - Run one category/item round trip against an in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use todoey_core::db::open_db_in_memory;
use todoey_core::{CategoryManager, ItemManager, RecordManager, SqliteStore};

fn main() -> ExitCode {
    println!("todoey_core ping={}", todoey_core::ping());
    println!("todoey_core version={}", todoey_core::core_version());

    match probe() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("todoey_core probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn probe() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;

    let mut categories = CategoryManager::new(SqliteStore::try_new(&conn)?);
    let groceries = categories.add("Groceries")?;
    categories.add("Work")?;
    println!("categories={}", categories.records().len());

    let mut items = ItemManager::new(SqliteStore::try_new(&conn)?, groceries);
    let milk = items.add("Buy milk")?;
    let done = items.toggle_done(milk.id).is_some_and(|item| item.is_done);
    println!("items={} first_done={done}", items.records().len());
    Ok(())
}
