//! Column order.
//!
//! The persisted order is reconciled against the current canonical column
//! set on load, so columns added in a later release land next to their
//! natural neighbours instead of drifting to one end.

use std::collections::{HashMap, HashSet};

use crate::store::{Aspect, TableStateStore};

use super::column::ColumnKey;

/// Direction for a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
}

/// Reconcile a stored order against the canonical one.
///
/// 1. Ids not in `canonical` (and repeats) are dropped.
/// 2. Each missing canonical id is inserted before the first element whose
///    canonical index exceeds its own, or appended.
/// 3. An empty result falls back to `canonical`.
pub fn reconcile_order(stored: &[String], canonical: &[String]) -> Vec<String> {
    let rank: HashMap<&str, usize> = canonical
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(canonical.len());
    for id in stored {
        if rank.contains_key(id.as_str()) && seen.insert(id.as_str()) {
            order.push(id.clone());
        }
    }

    if order.len() < stored.len() {
        log::debug!(
            "[order] dropped {} stale stored column id(s)",
            stored.len() - order.len()
        );
    }

    for (missing_rank, id) in canonical.iter().enumerate() {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let position = order
            .iter()
            .position(|existing| rank[existing.as_str()] > missing_rank)
            .unwrap_or(order.len());
        order.insert(position, id.clone());
    }

    if order.is_empty() {
        return canonical.to_vec();
    }
    order
}

/// Column order controller.
#[derive(Debug, Clone)]
pub struct ColumnOrder {
    canonical: Vec<String>,
    order: Vec<String>,
    store: TableStateStore,
}

impl ColumnOrder {
    /// Create a controller from the canonical order, restoring stored state.
    pub fn new(canonical: Vec<String>, store: TableStateStore) -> Self {
        let order = match store.load::<Vec<String>>(Aspect::Order) {
            Some(stored) => reconcile_order(&stored, &canonical),
            None => canonical.clone(),
        };
        Self {
            canonical,
            order,
            store,
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn canonical(&self) -> &[String] {
        &self.canonical
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|c| c == id)
    }

    /// Move the column at `from` to `to`.
    ///
    /// All reorder operations funnel through here. Out-of-range indices are
    /// ignored. Returns whether the order changed.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        let len = self.order.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let id = self.order.remove(from);
        log::debug!("[order] moving {id} from {from} to {to}");
        self.order.insert(to, id);
        self.persist();
        true
    }

    /// Swap a column with its neighbour. Clamped at the edges.
    pub fn move_column_by_id(&mut self, id: &str, direction: MoveDirection) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let to = match direction {
            MoveDirection::Left => from.saturating_sub(1),
            MoveDirection::Right => (from + 1).min(self.order.len() - 1),
        };
        self.move_column(from, to)
    }

    pub fn reset_order(&mut self) {
        self.order = self.canonical.clone();
        self.persist();
    }

    /// Replace the canonical set and re-reconcile the current order.
    pub fn set_canonical(&mut self, canonical: Vec<String>) {
        self.order = reconcile_order(&self.order, &canonical);
        self.canonical = canonical;
    }

    /// Project items into the current order, dropping those not in it.
    pub fn apply_order<C: ColumnKey + Clone>(&self, items: &[C]) -> Vec<C> {
        self.order
            .iter()
            .filter_map(|id| items.iter().find(|item| item.column_id() == id))
            .cloned()
            .collect()
    }

    fn persist(&self) {
        self.store.save(Aspect::Order, &self.order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::shared;
    use crate::store::KeyValueStore;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_columns_append_after_survivors() {
        let result = reconcile_order(&ids(&["B", "A"]), &ids(&["A", "B", "C", "D"]));
        assert_eq!(result, ids(&["B", "A", "C", "D"]));
    }

    #[test]
    fn test_new_column_lands_near_canonical_neighbour() {
        let result = reconcile_order(&ids(&["A", "C", "D"]), &ids(&["A", "B", "C", "D"]));
        assert_eq!(result, ids(&["A", "B", "C", "D"]));

        let result = reconcile_order(&ids(&["D", "A"]), &ids(&["A", "B", "C", "D"]));
        assert_eq!(result, ids(&["B", "C", "D", "A"]));
    }

    #[test]
    fn test_removed_and_duplicate_ids_dropped() {
        let result = reconcile_order(&ids(&["X", "B", "B", "A"]), &ids(&["A", "B"]));
        assert_eq!(result, ids(&["B", "A"]));
    }

    #[test]
    fn test_empty_falls_back_to_canonical() {
        let canonical = ids(&["A", "B"]);
        assert_eq!(reconcile_order(&[], &canonical), canonical);
        assert_eq!(reconcile_order(&ids(&["zzz"]), &canonical), canonical);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let canonical = ids(&["select", "a", "b", "c", "d", "e", "actions"]);
        let samples = [
            ids(&["e", "a"]),
            ids(&["gone", "d", "select", "b"]),
            ids(&["actions", "c", "c", "x", "a", "e"]),
            ids(&[]),
            ids(&["e", "d", "c", "b", "a", "select", "actions"]),
        ];
        for stored in samples {
            let once = reconcile_order(&stored, &canonical);
            let twice = reconcile_order(&once, &canonical);
            assert_eq!(once, twice, "stored = {stored:?}");
            assert_eq!(once.len(), canonical.len());
        }
    }

    #[test]
    fn test_move_column() {
        let mut order = ColumnOrder::new(ids(&["A", "B", "C", "D"]), TableStateStore::ephemeral("t"));
        assert!(order.move_column(0, 2));
        assert_eq!(order.order(), ids(&["B", "C", "A", "D"]).as_slice());
        assert!(!order.move_column(0, 9));
        assert!(!order.move_column(1, 1));
    }

    #[test]
    fn test_move_by_id_clamps() {
        let mut order = ColumnOrder::new(ids(&["A", "B", "C"]), TableStateStore::ephemeral("t"));
        assert!(!order.move_column_by_id("A", MoveDirection::Left));
        assert!(!order.move_column_by_id("C", MoveDirection::Right));
        assert!(order.move_column_by_id("A", MoveDirection::Right));
        assert_eq!(order.order(), ids(&["B", "A", "C"]).as_slice());
        assert!(!order.move_column_by_id("missing", MoveDirection::Left));
    }

    #[test]
    fn test_persist_and_restore_with_new_column() {
        let (backend, store) = shared("users");
        let mut order = ColumnOrder::new(ids(&["A", "B"]), store.clone());
        order.move_column(1, 0);
        assert_eq!(backend.get("users-order").unwrap().as_deref(), Some(r#"["B","A"]"#));

        let restored = ColumnOrder::new(ids(&["A", "B", "C", "D"]), store);
        assert_eq!(restored.order(), ids(&["B", "A", "C", "D"]).as_slice());
    }

    #[test]
    fn test_reset_order() {
        let mut order = ColumnOrder::new(ids(&["A", "B", "C"]), TableStateStore::ephemeral("t"));
        order.move_column(2, 0);
        order.reset_order();
        assert_eq!(order.order(), order.canonical());
    }

    #[test]
    fn test_apply_order() {
        let mut order = ColumnOrder::new(ids(&["A", "B", "C"]), TableStateStore::ephemeral("t"));
        order.move_column(2, 0);
        let items = ["A", "B", "Z"];
        assert_eq!(order.apply_order(&items), vec!["A", "B"]);
        let items = ids(&["B", "C"]);
        assert_eq!(order.apply_order(&items), ids(&["C", "B"]));
    }
}
