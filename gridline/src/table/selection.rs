//! Row selection.
//!
//! Selection is keyed by row id and survives page navigation, so a batch
//! action can span several pages. Select-all only ever covers the rows of the
//! current page.

use std::collections::HashSet;

/// Header checkbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Tracks selected rows by their ids.
#[derive(Debug, Clone, Default)]
pub struct RowSelection {
    selected: HashSet<String>,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle selection for a row. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Select exactly the rows of the current page.
    pub fn select_all<S: AsRef<str>>(&mut self, page_ids: &[S]) {
        self.selected = page_ids.iter().map(|id| id.as_ref().to_string()).collect();
    }

    /// Header checkbox click: clear when the page is fully selected, else select the page.
    pub fn toggle_all<S: AsRef<str>>(&mut self, page_ids: &[S]) {
        if self.is_all_selected(page_ids) {
            self.clear();
        } else {
            self.select_all(page_ids);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Every row on the page is selected (and the page is not empty).
    pub fn is_all_selected<S: AsRef<str>>(&self, page_ids: &[S]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.is_selected(id.as_ref()))
    }

    /// At least one but not every row on the page is selected.
    pub fn is_some_selected<S: AsRef<str>>(&self, page_ids: &[S]) -> bool {
        let count = page_ids
            .iter()
            .filter(|id| self.is_selected(id.as_ref()))
            .count();
        count > 0 && count < page_ids.len()
    }

    pub fn check_state<S: AsRef<str>>(&self, page_ids: &[S]) -> CheckState {
        if self.is_all_selected(page_ids) {
            CheckState::Checked
        } else if self.is_some_selected(page_ids) {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop ids that no longer exist in the dataset.
    pub fn retain<S: AsRef<str>>(&mut self, existing_ids: &[S]) {
        let existing: HashSet<&str> = existing_ids.iter().map(|id| id.as_ref()).collect();
        self.selected.retain(|id| existing.contains(id.as_str()));
    }
}
