//! Table composition.
//!
//! `DataTable` wires the layout controllers (order, visibility, widths,
//! reorder drag) and the data controllers (filters, sort, pagination,
//! selection) around a caller-owned dataset and produces a [`TableView`]
//! render model. It persists nothing itself; every controller persists its
//! own aspect under the table's storage key.

use std::fmt;
use std::sync::Arc;

use crate::store::{KeyValueStore, TableStateStore};

use super::batch::{BatchAction, BatchBar};
use super::column::{
    is_synthetic, CellContext, Column, SortDirection, SortState, WidthSpec, ACTIONS_COLUMN_ID,
    SELECT_COLUMN_ID,
};
use super::filter::TableFilters;
use super::order::{ColumnOrder, MoveDirection};
use super::pagination::{Pagination, PaginationConfig};
use super::reorder::{HeaderBounds, ReorderDrag};
use super::resize::{ColumnResize, NoopSurface, PointerSurface};
use super::selection::{CheckState, RowSelection};
use super::visibility::{ColumnVisibility, VisibilityConfig};

const SELECT_COLUMN_WIDTH: WidthSpec = WidthSpec {
    default: 48,
    min: Some(48),
    max: Some(48),
};

const ACTIONS_COLUMN_WIDTH: WidthSpec = WidthSpec {
    default: 100,
    min: Some(80),
    max: None,
};

/// Options for a [`DataTable`].
#[derive(Debug, Clone)]
pub struct DataTableOptions {
    /// Namespace for every persisted layout aspect.
    pub storage_key: String,
    /// Adds the checkbox column and enables selection.
    pub selectable: bool,
    pub pagination: PaginationConfig,
}

impl DataTableOptions {
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            selectable: false,
            pagination: PaginationConfig::default(),
        }
    }

    pub fn selectable(mut self) -> Self {
        self.selectable = true;
        self
    }

    pub fn with_pagination(mut self, config: PaginationConfig) -> Self {
        self.pagination = config;
        self
    }
}

/// A per-row action shown in the actions column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub id: String,
    pub label: String,
    pub destructive: bool,
}

impl RowAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            destructive: false,
        }
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// What a rendered column is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Select,
    Data,
    Actions,
}

/// A column as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewColumn {
    pub id: String,
    pub kind: ColumnKind,
    pub header: String,
    pub width: u32,
    pub sortable: bool,
    /// Direction when this column is the sorted one.
    pub sort: Option<SortDirection>,
    pub draggable: bool,
    pub locked: bool,
    pub class: Option<String>,
    /// Source of the active reorder drag.
    pub dragging: bool,
    pub resizing: bool,
}

/// A row as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub id: String,
    pub selected: bool,
    /// One entry per view column; empty for synthetic columns.
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
}

/// Pagination footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageSummary {
    fn of(p: &Pagination) -> Self {
        Self {
            page: p.page(),
            page_size: p.page_size(),
            total_pages: p.total_pages(),
            total_items: p.total_items(),
            start_index: p.start_index(),
            end_index: p.end_index(),
            has_prev: p.has_prev(),
            has_next: p.has_next(),
        }
    }
}

/// Render model produced by [`DataTable::view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub columns: Vec<ViewColumn>,
    pub rows: Vec<ViewRow>,
    /// Header checkbox, when the table is selectable.
    pub header_check: Option<CheckState>,
    pub page: PageSummary,
    pub batch: Option<BatchBar>,
    /// Insertion point of an active reorder drag, in view-column order.
    pub drop_index: Option<usize>,
    pub total_width: u32,
}

/// Header context menu command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    ToggleColumn(String),
    MoveLeft(String),
    MoveRight(String),
    ShowAll,
    HideAll,
    ResetOrder,
    ResetWidths,
}

/// Header context menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub command: MenuCommand,
    /// Checkbox state for column toggles.
    pub checked: Option<bool>,
    pub enabled: bool,
}

impl MenuItem {
    fn action(label: &str, command: MenuCommand) -> Self {
        Self {
            label: label.to_string(),
            command,
            checked: None,
            enabled: true,
        }
    }
}

type RowIdFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
type RowActionsFn<T> = Arc<dyn Fn(&T) -> Vec<RowAction> + Send + Sync>;

/// A paginated, sortable, filterable table with persisted column layout.
///
/// # Example
///
/// ```ignore
/// let mut table = DataTable::new(
///     vec![
///         Column::new("name", "Name", |u: &User, _| u.name.clone()).locked(),
///         Column::new("email", "Email", |u: &User, _| u.email.clone()),
///     ],
///     |u: &User| u.id.to_string(),
///     DataTableOptions::new("users").selectable(),
///     store,
/// );
/// table.set_data(users);
/// let view = table.view();
/// ```
pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    /// Indices into `rows` after filtering and sorting.
    view_rows: Vec<usize>,
    get_row_id: RowIdFn<T>,
    row_actions: Option<RowActionsFn<T>>,
    batch_actions: Vec<BatchAction<T>>,
    options: DataTableOptions,
    pagination: Pagination,
    visibility: ColumnVisibility,
    order: ColumnOrder,
    resize: ColumnResize,
    reorder: ReorderDrag,
    selection: RowSelection,
    filters: TableFilters,
    sort: Option<SortState>,
}

impl<T> fmt::Debug for DataTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("storage_key", &self.options.storage_key)
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("order", &self.order)
            .field("sort", &self.sort)
            .finish_non_exhaustive()
    }
}

impl<T> DataTable<T> {
    /// Create a table. Layout state is restored from `backend`.
    pub fn new(
        columns: Vec<Column<T>>,
        get_row_id: impl Fn(&T) -> String + Send + Sync + 'static,
        options: DataTableOptions,
        backend: Arc<dyn KeyValueStore>,
    ) -> Self {
        let store = TableStateStore::new(backend, options.storage_key.clone());

        let visibility = ColumnVisibility::new(
            columns.iter().map(VisibilityConfig::from_column).collect(),
            store.clone(),
        );
        let canonical = Self::canonical_order(&columns, options.selectable, false);
        let order = ColumnOrder::new(canonical, store.clone());
        let resize = ColumnResize::new(
            Self::width_specs(&columns, options.selectable, false),
            store.clone(),
            Box::new(NoopSurface),
        );
        let reorder = ReorderDrag::new(
            columns
                .iter()
                .filter(|c| c.is_locked())
                .map(|c| c.id.clone()),
        );
        let pagination = Pagination::new(store, options.pagination.clone());

        Self {
            columns,
            rows: Vec::new(),
            view_rows: Vec::new(),
            get_row_id: Arc::new(get_row_id),
            row_actions: None,
            batch_actions: Vec::new(),
            options,
            pagination,
            visibility,
            order,
            resize,
            reorder,
            selection: RowSelection::new(),
            filters: TableFilters::new(),
            sort: None,
        }
    }

    /// Add the actions column.
    pub fn with_row_actions(
        mut self,
        actions: impl Fn(&T) -> Vec<RowAction> + Send + Sync + 'static,
    ) -> Self {
        self.row_actions = Some(Arc::new(actions));
        self.sync_columns();
        self
    }

    pub fn with_batch_action(mut self, action: BatchAction<T>) -> Self {
        self.batch_actions.push(action);
        self
    }

    /// Route resize gestures through a host surface.
    pub fn with_pointer_surface(mut self, surface: Box<dyn PointerSurface>) -> Self {
        self.resize.set_surface(surface);
        self
    }

    fn canonical_order(columns: &[Column<T>], selectable: bool, actions: bool) -> Vec<String> {
        let mut ids = Vec::with_capacity(columns.len() + 2);
        if selectable {
            ids.push(SELECT_COLUMN_ID.to_string());
        }
        ids.extend(columns.iter().map(|c| c.id.clone()));
        if actions {
            ids.push(ACTIONS_COLUMN_ID.to_string());
        }
        ids
    }

    fn width_specs(
        columns: &[Column<T>],
        selectable: bool,
        actions: bool,
    ) -> Vec<(String, WidthSpec)> {
        let mut specs: Vec<(String, WidthSpec)> = columns
            .iter()
            .map(|c| (c.id.clone(), c.width_spec()))
            .collect();
        if selectable {
            specs.push((SELECT_COLUMN_ID.to_string(), SELECT_COLUMN_WIDTH));
        }
        if actions {
            specs.push((ACTIONS_COLUMN_ID.to_string(), ACTIONS_COLUMN_WIDTH));
        }
        specs
    }

    /// Re-derive controller inputs after the column set changed.
    fn sync_columns(&mut self) {
        let selectable = self.options.selectable;
        let actions = self.row_actions.is_some();
        self.order
            .set_canonical(Self::canonical_order(&self.columns, selectable, actions));
        self.resize
            .set_specs(Self::width_specs(&self.columns, selectable, actions));
        self.visibility.set_configs(
            self.columns
                .iter()
                .map(VisibilityConfig::from_column)
                .collect(),
        );
        self.reorder = ReorderDrag::new(
            self.columns
                .iter()
                .filter(|c| c.is_locked())
                .map(|c| c.id.clone()),
        );
    }

    /// Replace the column definitions.
    pub fn set_columns(&mut self, columns: Vec<Column<T>>) {
        self.columns = columns;
        self.sync_columns();
        self.refresh_rows();
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replace the dataset. Selection is kept; the page is clamped if needed.
    pub fn set_data(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.refresh_rows();
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn storage_key(&self) -> &str {
        &self.options.storage_key
    }

    /// Number of rows passing the filters.
    pub fn filtered_len(&self) -> usize {
        self.view_rows.len()
    }

    pub fn row_id(&self, row: &T) -> String {
        (self.get_row_id)(row)
    }

    fn refresh_rows(&mut self) {
        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&i| self.filters.matches(&self.rows[i], &self.columns))
            .collect();

        if let Some(sort) = &self.sort
            && let Some(column) = self
                .columns
                .iter()
                .find(|c| c.sort_key.as_deref() == Some(sort.key.as_str()))
        {
            indices.sort_by(|&a, &b| {
                let ord = column.compare(&self.rows[a], &self.rows[b]);
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        self.view_rows = indices;
        self.pagination.set_total(self.view_rows.len());
    }

    /// Rows on the current page.
    pub fn page_rows(&self) -> Vec<&T> {
        self.pagination
            .slice(&self.view_rows)
            .iter()
            .map(|&i| &self.rows[i])
            .collect()
    }

    /// Ids of the rows on the current page.
    pub fn page_row_ids(&self) -> Vec<String> {
        self.page_rows().into_iter().map(|r| self.row_id(r)).collect()
    }

    // -------------------------------------------------------------------------
    // Sorting & filtering
    // -------------------------------------------------------------------------

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Header click on a column: ascending first, then flip.
    ///
    /// Returns the new sort, or `None` if the column is not sortable.
    pub fn toggle_sort(&mut self, column_id: &str) -> Option<&SortState> {
        let key = self
            .columns
            .iter()
            .find(|c| c.id == column_id)?
            .sort_key
            .clone()?;
        let direction = match &self.sort {
            Some(current) if current.key == key => current.direction.reversed(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortState { key, direction });
        self.refresh_rows();
        self.sort.as_ref()
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.refresh_rows();
    }

    pub fn filters(&self) -> &TableFilters {
        &self.filters
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filters.set_search(query);
        self.filters_changed();
    }

    pub fn set_column_filter(&mut self, column_id: &str, value: Option<String>) {
        self.filters.set_column_filter(column_id, value);
        self.filters_changed();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.filters_changed();
    }

    fn filters_changed(&mut self) {
        self.pagination.first();
        self.refresh_rows();
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn set_page(&mut self, page: usize) {
        self.pagination.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pagination.set_page_size(page_size);
    }

    pub fn next_page(&mut self) {
        self.pagination.next();
    }

    pub fn prev_page(&mut self) {
        self.pagination.prev();
    }

    pub fn first_page(&mut self) {
        self.pagination.first();
    }

    pub fn last_page(&mut self) {
        self.pagination.last();
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn selection(&self) -> &RowSelection {
        &self.selection
    }

    pub fn is_selectable(&self) -> bool {
        self.options.selectable
    }

    /// Toggle a row. Ignored when the table is not selectable.
    pub fn toggle_row(&mut self, row_id: &str) -> bool {
        self.options.selectable && self.selection.toggle(row_id)
    }

    /// Select exactly the current page.
    pub fn select_all(&mut self) {
        if self.options.selectable {
            let ids = self.page_row_ids();
            self.selection.select_all(&ids);
        }
    }

    /// Header checkbox click.
    pub fn toggle_all(&mut self) {
        if self.options.selectable {
            let ids = self.page_row_ids();
            self.selection.toggle_all(&ids);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected rows from the whole dataset, in dataset order.
    pub fn selected_rows(&self) -> Vec<&T> {
        self.rows
            .iter()
            .filter(|r| self.selection.is_selected(&self.row_id(r)))
            .collect()
    }

    /// Run a batch action on the selected rows.
    ///
    /// Returns the number of rows handed to the action, or `None` if no
    /// action has that id.
    pub fn run_batch(&self, action_id: &str) -> Option<usize> {
        let action = self.batch_actions.iter().find(|a| a.id == action_id)?;
        let rows = self.selected_rows();
        log::debug!("[table] batch {action_id} on {} row(s)", rows.len());
        action.run(&rows);
        Some(rows.len())
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    pub fn visibility(&self) -> &ColumnVisibility {
        &self.visibility
    }

    pub fn visibility_mut(&mut self) -> &mut ColumnVisibility {
        &mut self.visibility
    }

    pub fn order(&self) -> &ColumnOrder {
        &self.order
    }

    pub fn order_mut(&mut self) -> &mut ColumnOrder {
        &mut self.order
    }

    pub fn resize(&self) -> &ColumnResize {
        &self.resize
    }

    pub fn resize_mut(&mut self) -> &mut ColumnResize {
        &mut self.resize
    }

    pub fn reorder(&self) -> &ReorderDrag {
        &self.reorder
    }

    /// Header drag started.
    pub fn drag_start(&mut self, column_id: &str) -> bool {
        self.reorder.drag_start(column_id)
    }

    /// Header drag moved over another header.
    pub fn drag_over(&mut self, target_id: &str, pointer_x: f64, bounds: HeaderBounds) -> Option<usize> {
        self.reorder
            .drag_over(&self.order, target_id, pointer_x, bounds)
    }

    /// Header dropped. Returns the applied move.
    pub fn drop_column(&mut self) -> Option<(usize, usize)> {
        self.reorder.drop(&mut self.order)
    }

    pub fn drag_end(&mut self) {
        self.reorder.drag_end();
    }

    /// Ordered, visible column ids (synthetic columns included).
    pub fn visible_column_ids(&self) -> Vec<String> {
        self.order
            .order()
            .iter()
            .filter(|id| self.visibility.is_visible(id))
            .cloned()
            .collect()
    }

    /// Header context menu, optionally opened on a specific column.
    pub fn header_menu(&self, column_id: Option<&str>) -> Vec<MenuItem> {
        let mut items = Vec::new();

        if let Some(id) = column_id
            && self.reorder.is_draggable(id)
            && let Some(index) = self.order.index_of(id)
        {
            let last = self.order.order().len() - 1;
            let neighbour_draggable =
                |i: usize| self.reorder.is_draggable(&self.order.order()[i]);
            items.push(MenuItem {
                enabled: index > 0 && neighbour_draggable(index - 1),
                ..MenuItem::action("Move left", MenuCommand::MoveLeft(id.to_string()))
            });
            items.push(MenuItem {
                enabled: index < last && neighbour_draggable(index + 1),
                ..MenuItem::action("Move right", MenuCommand::MoveRight(id.to_string()))
            });
        }

        for config in self.visibility.configs() {
            items.push(MenuItem {
                label: config.label.clone(),
                command: MenuCommand::ToggleColumn(config.id.clone()),
                checked: Some(self.visibility.is_visible(&config.id)),
                enabled: !config.locked,
            });
        }

        items.push(MenuItem::action("Show all columns", MenuCommand::ShowAll));
        items.push(MenuItem::action("Hide all columns", MenuCommand::HideAll));
        items.push(MenuItem::action("Reset column order", MenuCommand::ResetOrder));
        items.push(MenuItem::action("Reset column widths", MenuCommand::ResetWidths));
        items
    }

    /// Apply a header menu command.
    pub fn apply_menu(&mut self, command: &MenuCommand) {
        match command {
            MenuCommand::ToggleColumn(id) => self.visibility.toggle(id),
            MenuCommand::MoveLeft(id) | MenuCommand::MoveRight(id) => {
                let direction = if matches!(command, MenuCommand::MoveLeft(_)) {
                    MoveDirection::Left
                } else {
                    MoveDirection::Right
                };
                let Some(index) = self.order.index_of(id) else {
                    return;
                };
                let neighbour = match direction {
                    MoveDirection::Left => index.checked_sub(1),
                    MoveDirection::Right => Some(index + 1),
                };
                // Never swap with a pinned column.
                let allowed = self.reorder.is_draggable(id)
                    && neighbour
                        .and_then(|n| self.order.order().get(n))
                        .is_some_and(|n| self.reorder.is_draggable(n));
                if allowed {
                    self.order.move_column_by_id(id, direction);
                }
            }
            MenuCommand::ShowAll => self.visibility.show_all(),
            MenuCommand::HideAll => self.visibility.hide_all(),
            MenuCommand::ResetOrder => self.order.reset_order(),
            MenuCommand::ResetWidths => self.resize.reset_widths(),
        }
    }

    // -------------------------------------------------------------------------
    // Render model
    // -------------------------------------------------------------------------

    /// Build the render model for the current state.
    pub fn view(&self) -> TableView {
        let columns: Vec<ViewColumn> = self
            .visible_column_ids()
            .into_iter()
            .filter_map(|id| self.view_column(id))
            .collect();

        let page_rows = self.page_rows();
        let page_ids: Vec<String> = page_rows.iter().map(|r| self.row_id(r)).collect();

        let rows = page_rows
            .iter()
            .zip(&page_ids)
            .map(|(row, id)| self.view_row(row, id, &columns))
            .collect();

        // The drop index is in full-order terms; translate to view columns.
        let drop_index = self.reorder.drop_index().map(|index| {
            let order = self.order.order();
            order[..index.min(order.len())]
                .iter()
                .filter(|id| self.visibility.is_visible(id))
                .count()
        });

        TableView {
            total_width: columns.iter().map(|c| c.width).sum(),
            columns,
            rows,
            header_check: self
                .options
                .selectable
                .then(|| self.selection.check_state(&page_ids)),
            page: PageSummary::of(&self.pagination),
            batch: if self.options.selectable {
                BatchBar::build(&self.batch_actions, self.selection.len())
            } else {
                None
            },
            drop_index,
        }
    }

    fn view_column(&self, id: String) -> Option<ViewColumn> {
        let width = self.resize.width(&id);
        let resizing = self.resize.resizing_column() == Some(id.as_str());

        if id == SELECT_COLUMN_ID {
            return self.options.selectable.then(|| ViewColumn {
                kind: ColumnKind::Select,
                header: String::new(),
                width,
                sortable: false,
                sort: None,
                draggable: false,
                locked: true,
                class: None,
                dragging: false,
                resizing,
                id,
            });
        }
        if id == ACTIONS_COLUMN_ID {
            return self.row_actions.is_some().then(|| ViewColumn {
                kind: ColumnKind::Actions,
                header: String::new(),
                width,
                sortable: false,
                sort: None,
                draggable: false,
                locked: true,
                class: None,
                dragging: false,
                resizing,
                id,
            });
        }

        let column = self.columns.iter().find(|c| c.id == id)?;
        let sort = self
            .sort
            .as_ref()
            .filter(|s| column.sort_key.as_deref() == Some(s.key.as_str()));
        Some(ViewColumn {
            kind: ColumnKind::Data,
            header: column.header.render(self.sort.as_ref()),
            width,
            sortable: column.sort_key.is_some(),
            sort: sort.map(|s| s.direction),
            draggable: self.reorder.is_draggable(&id),
            locked: column.is_locked(),
            class: column.class.clone(),
            dragging: self.reorder.dragged_id() == Some(id.as_str()),
            resizing,
            id,
        })
    }

    fn view_row(&self, row: &T, id: &str, columns: &[ViewColumn]) -> ViewRow {
        let selected = self.selection.is_selected(id);
        let cells = columns
            .iter()
            .map(|vc| {
                if is_synthetic(&vc.id) {
                    return String::new();
                }
                let cx = CellContext {
                    dragging: vc.dragging,
                    resizing: vc.resizing,
                    selected,
                };
                self.columns
                    .iter()
                    .find(|c| c.id == vc.id)
                    .map(|c| c.render_cell(row, &cx))
                    .unwrap_or_default()
            })
            .collect();

        ViewRow {
            id: id.to_string(),
            selected,
            cells,
            actions: self
                .row_actions
                .as_ref()
                .map(|f| f(row))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[derive(Debug, Clone)]
    struct Item {
        id: u32,
        name: String,
    }

    fn items(n: u32) -> Vec<Item> {
        (1..=n)
            .map(|id| Item {
                id,
                name: format!("item-{id:03}"),
            })
            .collect()
    }

    fn table(backend: Arc<MemoryStore>) -> DataTable<Item> {
        DataTable::new(
            vec![
                Column::new("id", "ID", |i: &Item, _| i.id.to_string())
                    .sortable("id")
                    .sort_by(|a: &Item, b: &Item| a.id.cmp(&b.id))
                    .locked(),
                Column::new("name", "Name", |i: &Item, _| i.name.clone()).sortable("name"),
                Column::new("notes", "Notes", |_: &Item, _| String::new()).hidden_by_default(),
            ],
            |i: &Item| i.id.to_string(),
            DataTableOptions::new("items").selectable(),
            backend,
        )
    }

    #[test]
    fn test_view_columns_and_cells() {
        let mut t = table(Arc::new(MemoryStore::new()))
            .with_row_actions(|_| vec![RowAction::new("edit", "Edit")]);
        t.set_data(items(3));

        let view = t.view();
        let ids: Vec<&str> = view.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["select", "id", "name", "actions"]);
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.rows[0].cells, ["", "1", "item-001", ""]);
        assert_eq!(view.rows[0].actions[0].id, "edit");
        assert_eq!(view.header_check, Some(CheckState::Unchecked));
        assert_eq!(view.total_width, 48 + 150 + 150 + 100);
    }

    #[test]
    fn test_sort_toggle() {
        let mut t = table(Arc::new(MemoryStore::new()));
        t.set_data(items(12));
        t.toggle_sort("id");
        t.toggle_sort("id");
        assert_eq!(t.sort().unwrap().direction, SortDirection::Descending);
        assert_eq!(t.page_row_ids()[0], "12");
        assert!(t.toggle_sort("notes").is_none());
    }

    #[test]
    fn test_filter_resets_page() {
        let mut t = table(Arc::new(MemoryStore::new()));
        t.set_data(items(60));
        t.last_page();
        assert_eq!(t.pagination().page(), 3);
        t.set_search("item-05");
        assert_eq!(t.pagination().page(), 1);
        assert_eq!(t.filtered_len(), 10);
    }

    #[test]
    fn test_header_menu_locked_disabled() {
        let t = table(Arc::new(MemoryStore::new()));
        let menu = t.header_menu(None);
        let id_item = menu
            .iter()
            .find(|m| m.command == MenuCommand::ToggleColumn("id".into()))
            .unwrap();
        assert!(!id_item.enabled);
        let notes = menu
            .iter()
            .find(|m| m.command == MenuCommand::ToggleColumn("notes".into()))
            .unwrap();
        assert_eq!(notes.checked, Some(false));
    }

    #[test]
    fn test_menu_move_never_crosses_pinned() {
        let mut t = table(Arc::new(MemoryStore::new()));
        let menu = t.header_menu(Some("name"));
        assert!(!menu[0].enabled, "left neighbour is the locked id column");
        t.apply_menu(&MenuCommand::MoveLeft("name".into()));
        assert_eq!(t.order().order(), ["select", "id", "name", "notes"]);
        t.apply_menu(&MenuCommand::MoveRight("name".into()));
        assert_eq!(t.order().order(), ["select", "id", "notes", "name"]);
    }
}
