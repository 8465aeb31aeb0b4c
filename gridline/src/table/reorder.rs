//! Drag-and-drop column reordering.
//!
//! Turns a header drag gesture into at most one [`ColumnOrder::move_column`]
//! call.

use std::collections::HashSet;

use super::column::{ACTIONS_COLUMN_ID, SELECT_COLUMN_ID};
use super::order::ColumnOrder;

/// Horizontal extent of a header cell, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderBounds {
    pub left: f64,
    pub width: f64,
}

impl HeaderBounds {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn midpoint(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Reorder drag coordinator.
///
/// Pinned columns (locked ones plus the synthetic `select`/`actions`
/// columns) can neither be dragged nor act as drop targets, and a drop
/// never carries a column across one.
#[derive(Debug, Clone, Default)]
pub struct ReorderDrag {
    pinned: HashSet<String>,
    dragged_id: Option<String>,
    drop_index: Option<usize>,
}

impl ReorderDrag {
    /// Create a coordinator with the given locked column ids.
    pub fn new(locked: impl IntoIterator<Item = String>) -> Self {
        let mut pinned: HashSet<String> = locked.into_iter().collect();
        pinned.insert(SELECT_COLUMN_ID.to_string());
        pinned.insert(ACTIONS_COLUMN_ID.to_string());
        Self {
            pinned,
            dragged_id: None,
            drop_index: None,
        }
    }

    pub fn is_draggable(&self, id: &str) -> bool {
        !self.pinned.contains(id)
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.dragged_id.as_deref()
    }

    pub fn drop_index(&self) -> Option<usize> {
        self.drop_index
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged_id.is_some()
    }

    /// Begin dragging a header. Returns `false` for pinned columns.
    pub fn drag_start(&mut self, id: &str) -> bool {
        if !self.is_draggable(id) {
            self.clear();
            return false;
        }
        self.dragged_id = Some(id.to_string());
        self.drop_index = None;
        true
    }

    /// Pointer moved over a header.
    ///
    /// The insertion point is before `target_id` when the pointer is on its
    /// left half, after it otherwise. Positions past a pinned column are
    /// rejected.
    pub fn drag_over(
        &mut self,
        order: &ColumnOrder,
        target_id: &str,
        pointer_x: f64,
        bounds: HeaderBounds,
    ) -> Option<usize> {
        self.drop_index = None;
        let dragged = self.dragged_id.as_deref()?;
        if !self.is_draggable(target_id) {
            return None;
        }
        let from = order.index_of(dragged)?;
        let index = order.index_of(target_id)?;
        let drop_index = if pointer_x < bounds.midpoint() {
            index
        } else {
            index + 1
        };

        let crossed = if from < drop_index {
            &order.order()[from + 1..drop_index]
        } else {
            &order.order()[drop_index..from]
        };
        if crossed.iter().any(|id| self.pinned.contains(id)) {
            return None;
        }
        self.drop_index = Some(drop_index);
        Some(drop_index)
    }

    /// Complete the gesture. Returns the `(from, to)` move applied, if any.
    pub fn drop(&mut self, order: &mut ColumnOrder) -> Option<(usize, usize)> {
        let dragged = self.dragged_id.take();
        let drop_index = self.drop_index.take();
        let (dragged, mut to) = (dragged?, drop_index?);
        let from = order.index_of(&dragged)?;

        // Removing the source shifts everything after it down by one.
        if from < to {
            to -= 1;
        }
        if from == to {
            return None;
        }
        order.move_column(from, to).then_some((from, to))
    }

    /// Gesture ended without a drop.
    pub fn drag_end(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.dragged_id = None;
        self.drop_index = None;
    }
}
