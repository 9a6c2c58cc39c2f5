//! Category record.

use crate::model::{now_epoch_ms, validate_label, RecordValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a category.
pub type CategoryId = Uuid;

/// Named grouping of to-do items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Unique among categories, compared case-insensitively.
    pub name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Category {
    /// Creates a category stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        validate_label("name", &self.name)
    }
}
