//! Column definitions.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Id of the synthetic row-selection column.
pub const SELECT_COLUMN_ID: &str = "select";

/// Id of the synthetic per-row actions column.
pub const ACTIONS_COLUMN_ID: &str = "actions";

/// Width used for columns without a width spec.
pub const DEFAULT_COLUMN_WIDTH: u32 = 150;

/// Lower bound for every column width unless the column sets its own.
pub const MIN_COLUMN_WIDTH: u32 = 50;

/// Whether an id belongs to one of the synthetic columns.
pub fn is_synthetic(id: &str) -> bool {
    id == SELECT_COLUMN_ID || id == ACTIONS_COLUMN_ID
}

/// Sort direction for the single sorted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Current sort of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    /// Sort key of the sorted column.
    pub key: String,
    pub direction: SortDirection,
}

/// Header renderer that depends on the table's sort state.
pub type HeaderFn = Arc<dyn Fn(Option<&SortState>) -> String + Send + Sync>;

/// Header content: fixed text, or text derived from the sort state.
#[derive(Clone)]
pub enum HeaderSpec {
    Static(String),
    Dynamic(HeaderFn),
}

impl HeaderSpec {
    /// Create a sort-aware header.
    pub fn dynamic(f: impl Fn(Option<&SortState>) -> String + Send + Sync + 'static) -> Self {
        HeaderSpec::Dynamic(Arc::new(f))
    }

    /// Render the header text.
    pub fn render(&self, sort: Option<&SortState>) -> String {
        match self {
            HeaderSpec::Static(text) => text.clone(),
            HeaderSpec::Dynamic(f) => f(sort),
        }
    }
}

impl fmt::Debug for HeaderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderSpec::Static(text) => f.debug_tuple("Static").field(text).finish(),
            HeaderSpec::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for HeaderSpec {
    fn from(text: &str) -> Self {
        HeaderSpec::Static(text.to_string())
    }
}

impl From<String> for HeaderSpec {
    fn from(text: String) -> Self {
        HeaderSpec::Static(text)
    }
}

/// Column width specification in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthSpec {
    pub default: u32,
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl Default for WidthSpec {
    fn default() -> Self {
        Self {
            default: DEFAULT_COLUMN_WIDTH,
            min: None,
            max: None,
        }
    }
}

impl WidthSpec {
    pub fn new(default: u32) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    /// Effective lower bound.
    pub fn min_width(&self) -> u32 {
        self.min.unwrap_or(MIN_COLUMN_WIDTH)
    }

    /// Clamp a candidate width into `[min, max]`.
    ///
    /// Takes a signed value so raw drag arithmetic can be passed directly.
    pub fn clamp(&self, width: i64) -> u32 {
        let min = self.min_width();
        // A max below the min loses to the min.
        let max = self.max.map_or(u32::MAX, |m| m.max(min));
        width.clamp(min as i64, max as i64) as u32
    }

    /// The default width, clamped.
    pub fn initial(&self) -> u32 {
        self.clamp(self.default as i64)
    }
}

/// Column visibility specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilitySpec {
    /// Visible when nothing is stored.
    pub default: bool,
    /// Always visible and never reorderable.
    pub locked: bool,
}

impl Default for VisibilitySpec {
    fn default() -> Self {
        Self {
            default: true,
            locked: false,
        }
    }
}

/// Per-cell render context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellContext {
    /// The column is the source of an active reorder drag.
    pub dragging: bool,
    /// The column is being resized.
    pub resizing: bool,
    /// The row is selected.
    pub selected: bool,
}

type CellFn<T> = Arc<dyn Fn(&T, &CellContext) -> String + Send + Sync>;
type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;
type TextFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// A table column definition.
///
/// # Example
///
/// ```ignore
/// let name = Column::new("name", "Name", |u: &User, _| u.name.clone())
///     .sortable("name")
///     .width(WidthSpec { default: 200, min: Some(80), max: None })
///     .locked();
/// ```
pub struct Column<T> {
    /// Unique identifier for this column.
    pub id: String,
    pub header: HeaderSpec,
    /// Optional label for menus; falls back to a static header or the id.
    pub label: Option<String>,
    pub sort_key: Option<String>,
    pub width: Option<WidthSpec>,
    pub visibility: Option<VisibilitySpec>,
    /// Style class passed through to the renderer.
    pub class: Option<String>,
    cell: CellFn<T>,
    sort_by: Option<CompareFn<T>>,
    search: Option<TextFn<T>>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            label: self.label.clone(),
            sort_key: self.sort_key.clone(),
            width: self.width,
            visibility: self.visibility,
            class: self.class.clone(),
            cell: self.cell.clone(),
            sort_by: self.sort_by.clone(),
            search: self.search.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sort_key", &self.sort_key)
            .field("width", &self.width)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

impl<T> Column<T> {
    /// Create a column with the given id, header and cell renderer.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<HeaderSpec>,
        cell: impl Fn(&T, &CellContext) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            label: None,
            sort_key: None,
            width: None,
            visibility: None,
            class: None,
            cell: Arc::new(cell),
            sort_by: None,
            search: None,
        }
    }

    /// Make the column sortable under `key`.
    pub fn sortable(mut self, key: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self
    }

    /// Comparator used when sorting by this column. Defaults to cell text.
    pub fn sort_by(mut self, cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.sort_by = Some(Arc::new(cmp));
        self
    }

    pub fn width(mut self, spec: WidthSpec) -> Self {
        self.width = Some(spec);
        self
    }

    /// Hidden unless the user shows it.
    pub fn hidden_by_default(mut self) -> Self {
        let spec = self.visibility.unwrap_or_default();
        self.visibility = Some(VisibilitySpec {
            default: false,
            ..spec
        });
        self
    }

    /// Lock the column: always visible, never dragged.
    pub fn locked(mut self) -> Self {
        self.visibility = Some(VisibilitySpec {
            default: true,
            locked: true,
        });
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Text the search filter matches against. Defaults to cell text.
    pub fn searchable(mut self, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.search = Some(Arc::new(f));
        self
    }

    /// Render the cell for a row.
    pub fn render_cell(&self, row: &T, cx: &CellContext) -> String {
        (self.cell)(row, cx)
    }

    /// Text used by the search filter.
    pub fn search_text(&self, row: &T) -> String {
        match &self.search {
            Some(f) => f(row),
            None => self.render_cell(row, &CellContext::default()),
        }
    }

    /// Compare two rows by this column.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        match &self.sort_by {
            Some(cmp) => cmp(a, b),
            None => {
                let cx = CellContext::default();
                self.render_cell(a, &cx).cmp(&self.render_cell(b, &cx))
            }
        }
    }

    /// Label for menus.
    pub fn menu_label(&self) -> String {
        match (&self.label, &self.header) {
            (Some(label), _) => label.clone(),
            (None, HeaderSpec::Static(text)) => text.clone(),
            (None, HeaderSpec::Dynamic(_)) => self.id.clone(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.visibility.is_some_and(|v| v.locked)
    }

    /// Width spec, or the default one.
    pub fn width_spec(&self) -> WidthSpec {
        self.width.unwrap_or_default()
    }
}

/// Anything that carries a column id.
pub trait ColumnKey {
    fn column_id(&self) -> &str;
}

impl<T> ColumnKey for Column<T> {
    fn column_id(&self) -> &str {
        &self.id
    }
}

impl ColumnKey for String {
    fn column_id(&self) -> &str {
        self
    }
}

impl ColumnKey for &str {
    fn column_id(&self) -> &str {
        self
    }
}
