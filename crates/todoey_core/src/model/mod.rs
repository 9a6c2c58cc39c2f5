//! To-do domain model.
//!
//! # Responsibility
//! - Define the category/item records shared by managers and storage.
//! - Own label normalization used by add/rename validation and matching.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Labels (`Category::name`, `Item::title`) are never blank after trim.

pub mod category;
pub mod item;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Validation failure for a record about to be persisted or just loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Label is empty or whitespace-only.
    BlankLabel { field: &'static str },
    /// Label carries leading or trailing whitespace.
    UntrimmedLabel { field: &'static str },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankLabel { field } => write!(f, "{field} must not be blank"),
            Self::UntrimmedLabel { field } => {
                write!(f, "{field} must not have surrounding whitespace")
            }
        }
    }
}

impl Error for RecordValidationError {}

/// Trims raw user input into a storable label.
///
/// Returns `None` when nothing but whitespace was entered.
pub fn normalize_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Folds a label into the key used for case- and diacritic-insensitive
/// matching.
///
/// Both the exact duplicate check and the substring search compare folded
/// keys, so `"Groceries"` and `"groceries"` collide, and `"cafe"` finds
/// `"Café"`.
pub fn fold_label(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

pub(crate) fn validate_label(field: &'static str, label: &str) -> Result<(), RecordValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(RecordValidationError::BlankLabel { field });
    }
    if trimmed.len() != label.len() {
        return Err(RecordValidationError::UntrimmedLabel { field });
    }
    Ok(())
}

/// Current wall clock in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
