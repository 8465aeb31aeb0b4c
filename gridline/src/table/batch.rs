//! Batch actions over the selected rows.

use std::fmt;
use std::sync::Arc;

type BatchFn<T> = Arc<dyn Fn(&[&T]) + Send + Sync>;

/// An action applied to every selected row at once.
pub struct BatchAction<T> {
    pub id: String,
    pub label: String,
    /// Rendered with a warning style and usually confirmed by the host.
    pub destructive: bool,
    run: BatchFn<T>,
}

impl<T> BatchAction<T> {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        run: impl Fn(&[&T]) + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            destructive: false,
            run: Arc::new(run),
        }
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    pub fn run(&self, rows: &[&T]) {
        (self.run)(rows)
    }
}

impl<T> Clone for BatchAction<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            destructive: self.destructive,
            run: self.run.clone(),
        }
    }
}

impl<T> fmt::Debug for BatchAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("destructive", &self.destructive)
            .finish_non_exhaustive()
    }
}

/// Batch bar as rendered: only present while something is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchBar {
    pub selected_count: usize,
    pub actions: Vec<BatchButton>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchButton {
    pub id: String,
    pub label: String,
    pub destructive: bool,
}

impl BatchBar {
    /// Build the bar for a selection size. `None` when nothing is selected.
    pub fn build<T>(actions: &[BatchAction<T>], selected_count: usize) -> Option<Self> {
        if selected_count == 0 {
            return None;
        }
        Some(Self {
            selected_count,
            actions: actions
                .iter()
                .map(|a| BatchButton {
                    id: a.id.clone(),
                    label: a.label.clone(),
                    destructive: a.destructive,
                })
                .collect(),
        })
    }
}
