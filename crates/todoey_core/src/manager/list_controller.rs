//! Swipe-action and search-bar plumbing shared by both list screens.
//!
//! Works against any `RecordManager`, so the category and item screens get
//! identical row actions and search-as-you-type behavior.

use crate::manager::{ManagerError, ManagerResult, RecordManager};

/// Action revealed by swiping a row to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Delete,
    Update,
}

impl RowAction {
    pub fn title(self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Update => "Update",
        }
    }

    /// Destructive actions are styled red and run on full swipe.
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// Result of a performed row action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    Deleted,
    Updated(T),
}

/// Result of a search bar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<T> {
    /// Records now shown by the list.
    pub records: Vec<T>,
    /// Whether the search field should give up keyboard focus.
    pub resign_focus: bool,
}

/// Drives a `RecordManager` from list UI events.
pub struct ListController<M: RecordManager> {
    manager: M,
}

impl<M: RecordManager> ListController<M> {
    pub fn new(manager: M) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut M {
        &mut self.manager
    }

    pub fn into_inner(self) -> M {
        self.manager
    }

    pub fn row_count(&self) -> usize {
        self.manager.records().len()
    }

    /// Actions for a row swipe, in display order.
    pub fn row_actions(&self) -> [RowAction; 2] {
        [RowAction::Delete, RowAction::Update]
    }

    /// Runs a swipe action on `row`.
    ///
    /// `input` is the text entered in the update prompt; a missing value is
    /// treated as empty input.
    pub fn perform(
        &mut self,
        row: usize,
        action: RowAction,
        input: Option<&str>,
    ) -> ManagerResult<ActionOutcome<M::Record>> {
        let id = self.manager.id_at(row).ok_or(ManagerError::RowOutOfRange {
            row,
            len: self.row_count(),
        })?;
        match action {
            RowAction::Delete => {
                self.manager.delete(id)?;
                Ok(ActionOutcome::Deleted)
            }
            RowAction::Update => {
                let record = self.manager.rename(id, input.unwrap_or_default())?;
                Ok(ActionOutcome::Updated(record))
            }
        }
    }

    /// Row tap.
    pub fn select_row(&mut self, row: usize) -> Option<M::Record> {
        self.manager.activate(row)
    }

    /// Search-as-you-type. Re-queries on every keystroke.
    pub fn search_text_changed(&mut self, text: &str) -> SearchOutcome<M::Record> {
        let trimmed = text.trim();
        SearchOutcome {
            records: self.manager.search(trimmed),
            resign_focus: trimmed.is_empty(),
        }
    }

    /// Search button pressed.
    pub fn search_submitted(&mut self, text: &str) -> SearchOutcome<M::Record> {
        SearchOutcome {
            records: self.manager.search(text.trim()),
            resign_focus: true,
        }
    }
}
