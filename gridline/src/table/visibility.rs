//! Column visibility.

use std::collections::HashMap;

use crate::store::{Aspect, TableStateStore};

use super::column::Column;

/// Visibility settings for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityConfig {
    pub id: String,
    pub label: String,
    pub default_visible: bool,
    pub locked: bool,
}

impl VisibilityConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            default_visible: true,
            locked: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Derive the config from a column definition.
    pub fn from_column<T>(column: &Column<T>) -> Self {
        let spec = column.visibility.unwrap_or_default();
        Self {
            id: column.id.clone(),
            label: column.menu_label(),
            default_visible: spec.default || spec.locked,
            locked: spec.locked,
        }
    }
}

/// Column visibility controller.
///
/// Locked columns are visible no matter what is stored or requested.
#[derive(Debug, Clone)]
pub struct ColumnVisibility {
    configs: Vec<VisibilityConfig>,
    visible: HashMap<String, bool>,
    store: TableStateStore,
}

impl ColumnVisibility {
    /// Create a controller, merging stored state with the configs.
    pub fn new(configs: Vec<VisibilityConfig>, store: TableStateStore) -> Self {
        let stored = store
            .load::<HashMap<String, bool>>(Aspect::Visibility)
            .unwrap_or_default();
        let visible = Self::merge(&configs, &stored);
        Self {
            configs,
            visible,
            store,
        }
    }

    fn defaults(configs: &[VisibilityConfig]) -> HashMap<String, bool> {
        configs
            .iter()
            .map(|c| (c.id.clone(), c.default_visible || c.locked))
            .collect()
    }

    /// Merge a stored map into the current configs.
    ///
    /// Ids that are no longer configured are dropped.
    fn merge(configs: &[VisibilityConfig], stored: &HashMap<String, bool>) -> HashMap<String, bool> {
        let dropped = stored
            .keys()
            .filter(|id| !configs.iter().any(|c| &c.id == *id))
            .count();
        if dropped > 0 {
            log::debug!("[visibility] dropping {dropped} unknown stored column(s)");
        }

        configs
            .iter()
            .map(|c| {
                let visible = c.locked || stored.get(&c.id).copied().unwrap_or(c.default_visible);
                (c.id.clone(), visible)
            })
            .collect()
    }

    pub fn configs(&self) -> &[VisibilityConfig] {
        &self.configs
    }

    /// Whether a column is visible. Unknown ids are visible.
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(true)
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.configs.iter().any(|c| c.id == id && c.locked)
    }

    /// Visible ids in config order.
    pub fn visible_ids(&self) -> Vec<String> {
        self.configs
            .iter()
            .filter(|c| self.is_visible(&c.id))
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn hidden_count(&self) -> usize {
        self.configs.iter().filter(|c| !self.is_visible(&c.id)).count()
    }

    /// Flip a column. No-op for locked or unknown columns.
    pub fn toggle(&mut self, id: &str) {
        if self.is_locked(id) {
            return;
        }
        if let Some(visible) = self.visible.get_mut(id) {
            *visible = !*visible;
            self.persist();
        }
    }

    /// Show or hide a column. Hiding a locked column is a no-op.
    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if !visible && self.is_locked(id) {
            return;
        }
        if let Some(current) = self.visible.get_mut(id)
            && *current != visible
        {
            *current = visible;
            self.persist();
        }
    }

    pub fn show_all(&mut self) {
        for visible in self.visible.values_mut() {
            *visible = true;
        }
        self.persist();
    }

    /// Hide everything except locked columns.
    pub fn hide_all(&mut self) {
        for config in &self.configs {
            self.visible.insert(config.id.clone(), config.locked);
        }
        self.persist();
    }

    /// Back to the configured defaults.
    pub fn reset(&mut self) {
        self.visible = Self::defaults(&self.configs);
        self.persist();
    }

    /// Replace the column configs, keeping the visibility of surviving ids.
    pub fn set_configs(&mut self, configs: Vec<VisibilityConfig>) {
        self.visible = Self::merge(&configs, &self.visible);
        self.configs = configs;
    }

    fn persist(&self) {
        self.store.save(Aspect::Visibility, &self.visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{failing, shared};
    use crate::store::KeyValueStore;

    fn configs() -> Vec<VisibilityConfig> {
        vec![
            VisibilityConfig::new("name", "Name").locked(),
            VisibilityConfig::new("email", "Email"),
            VisibilityConfig::new("phone", "Phone").hidden(),
        ]
    }

    #[test]
    fn test_defaults() {
        let v = ColumnVisibility::new(configs(), TableStateStore::ephemeral("t"));
        assert_eq!(v.visible_ids(), vec!["name", "email"]);
        assert_eq!(v.hidden_count(), 1);
    }

    #[test]
    fn test_toggle_locked_is_noop() {
        let mut v = ColumnVisibility::new(configs(), TableStateStore::ephemeral("t"));
        v.toggle("name");
        assert!(v.is_visible("name"));
        v.set_visible("name", false);
        assert!(v.is_visible("name"));
    }

    #[test]
    fn test_hide_all_keeps_locked() {
        let mut v = ColumnVisibility::new(configs(), TableStateStore::ephemeral("t"));
        v.hide_all();
        assert_eq!(v.visible_ids(), vec!["name"]);
        v.show_all();
        assert_eq!(v.visible_ids(), vec!["name", "email", "phone"]);
    }

    #[test]
    fn test_merge_with_stored_state() {
        let (backend, store) = shared("users");
        backend
            .set(
                "column-visibility-users",
                r#"{"name":false,"email":false,"removed":true}"#,
            )
            .unwrap();

        let v = ColumnVisibility::new(configs(), store);
        // Locked wins over stored, missing falls back to default.
        assert!(v.is_visible("name"));
        assert!(!v.is_visible("email"));
        assert!(!v.is_visible("phone"));
        assert!(!v.visible.contains_key("removed"));
        // Not re-persisted until the next write.
        assert!(backend
            .get("column-visibility-users")
            .unwrap()
            .unwrap()
            .contains("removed"));
    }

    #[test]
    fn test_toggle_persists() {
        let (backend, store) = shared("users");
        let mut v = ColumnVisibility::new(configs(), store.clone());
        v.toggle("phone");

        let raw = backend.get("column-visibility-users").unwrap().unwrap();
        let stored: HashMap<String, bool> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.get("phone"), Some(&true));

        let restored = ColumnVisibility::new(configs(), store);
        assert!(restored.is_visible("phone"));
    }

    #[test]
    fn test_storage_failure_falls_back_to_defaults() {
        let mut v = ColumnVisibility::new(configs(), failing("t"));
        assert_eq!(v.visible_ids(), vec!["name", "email"]);
        v.toggle("email");
        assert!(!v.is_visible("email"));
    }

    #[test]
    fn test_reset() {
        let mut v = ColumnVisibility::new(configs(), TableStateStore::ephemeral("t"));
        v.show_all();
        v.reset();
        assert_eq!(v.visible_ids(), vec!["name", "email"]);
    }
}
