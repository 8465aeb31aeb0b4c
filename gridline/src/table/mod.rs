//! Data table state.
//!
//! Each controller owns one concern and persists its own aspect through a
//! [`TableStateStore`](crate::store::TableStateStore). [`DataTable`] composes
//! them into a render model.

mod batch;
mod column;
mod data_table;
mod filter;
mod order;
mod pagination;
mod reorder;
mod resize;
mod selection;
mod visibility;

pub use batch::{BatchAction, BatchBar, BatchButton};
pub use column::{
    is_synthetic, CellContext, Column, ColumnKey, HeaderFn, HeaderSpec, SortDirection, SortState,
    VisibilitySpec, WidthSpec, ACTIONS_COLUMN_ID, DEFAULT_COLUMN_WIDTH, MIN_COLUMN_WIDTH,
    SELECT_COLUMN_ID,
};
pub use data_table::{
    ColumnKind, DataTable, DataTableOptions, MenuCommand, MenuItem, PageSummary, RowAction,
    TableView, ViewColumn, ViewRow,
};
pub use filter::TableFilters;
pub use order::{reconcile_order, ColumnOrder, MoveDirection};
pub use pagination::{Pagination, PaginationConfig, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
pub use reorder::{HeaderBounds, ReorderDrag};
pub use resize::{
    ColumnResize, DragStyle, NoopSurface, PointerSurface, ResizePhase, ResizeSession,
    DRAG_THRESHOLD, RESIZE_DRAG_STYLE,
};
pub use selection::{CheckState, RowSelection};
pub use visibility::{ColumnVisibility, VisibilityConfig};
