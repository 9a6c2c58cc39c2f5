//! Item record.
//!
//! # Invariants
//! - An item belongs to exactly one category for its whole lifetime.
//! - Titles are unique within the parent category, compared case-insensitively.

use crate::model::category::CategoryId;
use crate::model::{now_epoch_ms, validate_label, RecordValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an item.
pub type ItemId = Uuid;

/// To-do entry with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Parent category.
    pub category_id: CategoryId,
    pub title: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub is_done: bool,
}

impl Item {
    /// Creates an open (not done) item under `category_id`.
    pub fn new(category_id: CategoryId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            title: title.into(),
            created_at: now_epoch_ms(),
            is_done: false,
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        validate_label("title", &self.title)
    }

    /// Flips the completion flag.
    pub fn toggle_done(&mut self) {
        self.is_done = !self.is_done;
    }
}
