//! Row filters: free-text search plus exact per-column values.

use std::collections::BTreeMap;

use super::column::Column;

/// Filter state for a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilters {
    search: String,
    columns: BTreeMap<String, String>,
}

impl TableFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn column_filter(&self, id: &str) -> Option<&str> {
        self.columns.get(id).map(String::as_str)
    }

    /// Set or clear (`None`) the exact-value filter on a column.
    pub fn set_column_filter(&mut self, id: impl Into<String>, value: Option<String>) {
        let id = id.into();
        match value {
            Some(value) if !value.is_empty() => {
                self.columns.insert(id, value);
            }
            _ => {
                self.columns.remove(&id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.columns.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || !self.columns.is_empty()
    }

    /// Whether a row passes every active filter.
    ///
    /// Search is a case-insensitive substring match against any column's
    /// search text; column filters compare case-insensitively for equality.
    pub fn matches<T>(&self, row: &T, columns: &[Column<T>]) -> bool {
        for (id, expected) in &self.columns {
            let Some(column) = columns.iter().find(|c| &c.id == id) else {
                continue;
            };
            if !column.search_text(row).eq_ignore_ascii_case(expected) {
                return false;
            }
        }

        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        columns
            .iter()
            .any(|c| c.search_text(row).to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User {
        name: &'static str,
        role: &'static str,
    }

    fn columns() -> Vec<Column<User>> {
        vec![
            Column::new("name", "Name", |u: &User, _| u.name.to_string()),
            Column::new("role", "Role", |u: &User, _| u.role.to_string()),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut f = TableFilters::new();
        let cols = columns();
        let ada = User { name: "Ada Lovelace", role: "admin" };
        f.set_search("LOVE");
        assert!(f.matches(&ada, &cols));
        f.set_search("turing");
        assert!(!f.matches(&ada, &cols));
    }

    #[test]
    fn test_column_filter_exact() {
        let mut f = TableFilters::new();
        let cols = columns();
        f.set_column_filter("role", Some("Admin".into()));
        assert!(f.matches(&User { name: "a", role: "admin" }, &cols));
        assert!(!f.matches(&User { name: "b", role: "administrator" }, &cols));
        f.set_column_filter("role", None);
        assert!(!f.is_active());
    }

    #[test]
    fn test_unknown_column_filter_ignored() {
        let mut f = TableFilters::new();
        f.set_column_filter("missing", Some("x".into()));
        assert!(f.matches(&User { name: "a", role: "b" }, &columns()));
    }
}
