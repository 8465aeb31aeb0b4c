//! Data table scenarios: layout persistence, locked columns, selection,
//! gestures and batch actions.

use std::sync::{Arc, Mutex};

use gridline::table::{
    BatchAction, CheckState, ColumnKind, DragStyle, HeaderBounds, MenuCommand, PointerSurface,
    RowAction, SortDirection, WidthSpec,
};
use gridline::{Column, DataTable, DataTableOptions, KeyValueStore, MemoryStore, SqliteStore};

#[derive(Debug, Clone)]
struct User {
    id: u32,
    name: String,
    role: &'static str,
}

fn users(n: u32) -> Vec<User> {
    (1..=n)
        .map(|id| User {
            id,
            name: format!("user {id:02}"),
            role: if id % 3 == 0 { "admin" } else { "member" },
        })
        .collect()
}

fn columns() -> Vec<Column<User>> {
    vec![
        Column::new("name", "Name", |u: &User, _| u.name.clone())
            .sortable("name")
            .locked(),
        Column::new("email", "Email", |u: &User, _| format!("u{}@example.com", u.id)),
        Column::new("role", "Role", |u: &User, _| u.role.to_string()).sortable("role"),
        Column::new("id", "ID", |u: &User, _| u.id.to_string())
            .sortable("id")
            .sort_by(|a: &User, b: &User| a.id.cmp(&b.id))
            .width(WidthSpec {
                default: 80,
                min: Some(60),
                max: Some(120),
            }),
    ]
}

fn table(backend: Arc<dyn KeyValueStore>) -> DataTable<User> {
    let mut table = DataTable::new(
        columns(),
        |u: &User| u.id.to_string(),
        DataTableOptions::new("users").selectable(),
        backend,
    )
    .with_row_actions(|u: &User| {
        let mut actions = vec![RowAction::new("edit", "Edit")];
        if u.role != "admin" {
            actions.push(RowAction::new("delete", "Delete").destructive());
        }
        actions
    });
    table.set_data(users(60));
    table
}

fn view_ids(table: &DataTable<User>) -> Vec<String> {
    table.view().columns.into_iter().map(|c| c.id).collect()
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_canonical_layout() {
    let t = table(Arc::new(MemoryStore::new()));
    assert_eq!(view_ids(&t), ["select", "name", "email", "role", "id", "actions"]);

    let view = t.view();
    assert_eq!(view.columns[0].kind, ColumnKind::Select);
    assert_eq!(view.columns[5].kind, ColumnKind::Actions);
    assert_eq!(view.columns[4].width, 80);
    assert!(!view.columns[1].draggable);
    assert!(view.columns[2].draggable);
    assert_eq!(view.rows.len(), 25);
    assert_eq!(view.rows[2].actions.len(), 1);
}

#[test]
fn test_layout_survives_reload() {
    let backend = Arc::new(MemoryStore::new());
    {
        let mut t = table(backend.clone());
        t.apply_menu(&MenuCommand::ToggleColumn("email".into()));
        t.apply_menu(&MenuCommand::MoveRight("role".into()));
        t.resize_mut().set_width("role", 200);
        t.set_page_size(50);
    }

    let t = table(backend.clone());
    assert_eq!(view_ids(&t), ["select", "name", "id", "role", "actions"]);
    assert_eq!(t.resize().width("role"), 200);
    assert_eq!(t.pagination().page_size(), 50);
    assert_eq!(t.pagination().page(), 1);

    let mut keys = backend.keys();
    keys.sort();
    assert_eq!(
        keys,
        [
            "column-visibility-users",
            "column-widths-users",
            "pagination-users",
            "users-order",
        ]
    );
}

#[test]
fn test_layout_in_sqlite() {
    let backend = Arc::new(SqliteStore::open_in_memory().unwrap());
    {
        let mut t = table(backend.clone());
        t.apply_menu(&MenuCommand::HideAll);
    }
    let t = table(backend);
    assert_eq!(view_ids(&t), ["select", "name", "actions"]);
}

#[test]
fn test_tables_do_not_share_layout() {
    let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut users_table = table(backend.clone());
    users_table.apply_menu(&MenuCommand::ToggleColumn("role".into()));

    let other = DataTable::new(
        columns(),
        |u: &User| u.id.to_string(),
        DataTableOptions::new("admins"),
        backend,
    );
    assert!(other.visibility().is_visible("role"));
    assert_eq!(other.order().order(), ["name", "email", "role", "id"]);
}

#[test]
fn test_stored_order_reconciled_with_new_columns() {
    let backend = Arc::new(MemoryStore::new());
    backend
        .set("users-order", r#"["select","role","name","gone","actions"]"#)
        .unwrap();
    let t = table(backend);
    assert_eq!(
        t.order().order(),
        ["select", "email", "role", "name", "id", "actions"]
    );
}

#[test]
fn test_corrupt_layout_falls_back() {
    let backend = Arc::new(MemoryStore::new());
    backend.set("column-widths-users", "{not json").unwrap();
    backend.set("pagination-users", "0").unwrap();
    let t = table(backend);
    assert_eq!(t.resize().width("id"), 80);
    assert_eq!(t.pagination().page_size(), 25);
}

// =============================================================================
// Locked columns
// =============================================================================

#[test]
fn test_locked_column_invariants() {
    let mut t = table(Arc::new(MemoryStore::new()));

    t.apply_menu(&MenuCommand::ToggleColumn("name".into()));
    assert!(t.visibility().is_visible("name"));

    t.apply_menu(&MenuCommand::HideAll);
    assert_eq!(view_ids(&t), ["select", "name", "actions"]);
    t.apply_menu(&MenuCommand::ShowAll);

    assert!(!t.drag_start("name"));
    assert!(t.drag_start("email"));
    let bounds = HeaderBounds::new(48.0, 150.0);
    assert_eq!(t.drag_over("name", 50.0, bounds), None);
    assert_eq!(t.drop_column(), None);
    assert_eq!(t.order().index_of("name"), Some(1));
}

// =============================================================================
// Gestures
// =============================================================================

#[test]
fn test_drag_reorder_through_view() {
    let mut t = table(Arc::new(MemoryStore::new()));

    assert!(t.drag_start("email"));
    // Right half of "id" inserts after it.
    assert_eq!(t.drag_over("id", 590.0, HeaderBounds::new(500.0, 80.0)), Some(5));
    let view = t.view();
    assert!(view.columns[2].dragging);
    assert_eq!(view.drop_index, Some(5));

    assert_eq!(t.drop_column(), Some((2, 4)));
    assert_eq!(view_ids(&t), ["select", "name", "role", "id", "email", "actions"]);
    assert!(!t.reorder().is_dragging());
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl PointerSurface for Recorder {
    fn attach_listeners(&mut self) {
        self.0.lock().unwrap().push("attach".into());
    }

    fn detach_listeners(&mut self) {
        self.0.lock().unwrap().push("detach".into());
    }

    fn set_drag_style(&mut self, style: Option<DragStyle>) {
        let event = match style {
            Some(style) => format!("style {}", style.cursor),
            None => "style reset".to_string(),
        };
        self.0.lock().unwrap().push(event);
    }
}

#[test]
fn test_resize_gesture_through_table() {
    let recorder = Recorder::default();
    let events = recorder.0.clone();
    let backend = Arc::new(MemoryStore::new());
    let mut t = table(backend.clone()).with_pointer_surface(Box::new(recorder));

    t.resize_mut().pointer_down("id", 100.0);
    t.resize_mut().pointer_move(102.0);
    assert!(t.view().columns.iter().all(|c| !c.resizing));
    t.resize_mut().pointer_move(200.0);

    let view = t.view();
    let id = view.columns.iter().find(|c| c.id == "id").unwrap();
    assert!(id.resizing);
    assert_eq!(id.width, 120);

    t.resize_mut().pointer_up();
    assert_eq!(t.resize().width("id"), 120);
    assert!(backend.get("column-widths-users").unwrap().is_some());

    drop(t);
    assert_eq!(
        *events.lock().unwrap(),
        ["attach", "style col-resize", "style reset", "detach"]
    );
}

#[test]
fn test_resize_listeners_released_on_drop() {
    let recorder = Recorder::default();
    let events = recorder.0.clone();
    let mut t = table(Arc::new(MemoryStore::new())).with_pointer_surface(Box::new(recorder));
    t.resize_mut().pointer_down("role", 10.0);
    drop(t);
    assert_eq!(*events.lock().unwrap(), ["attach", "detach"]);
}

// =============================================================================
// Data
// =============================================================================

#[test]
fn test_select_all_scoped_to_page() {
    let mut t = table(Arc::new(MemoryStore::new()));
    t.next_page();
    t.select_all();
    assert_eq!(t.selection().len(), 25);
    assert_eq!(t.view().header_check, Some(CheckState::Checked));

    t.next_page();
    assert_eq!(t.view().header_check, Some(CheckState::Unchecked));
    assert_eq!(t.selection().len(), 25);

    t.toggle_row("51");
    assert_eq!(t.view().header_check, Some(CheckState::Indeterminate));

    t.prev_page();
    t.toggle_all();
    assert!(t.selection().is_empty());
}

#[test]
fn test_batch_runs_across_pages() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut t = table(Arc::new(MemoryStore::new())).with_batch_action(
        BatchAction::new("archive", "Archive", move |rows: &[&User]| {
            sink.lock().unwrap().extend(rows.iter().map(|u| u.id));
        }),
    );

    assert!(t.view().batch.is_none());
    t.toggle_row("3");
    t.last_page();
    t.toggle_row("60");

    let batch = t.view().batch.unwrap();
    assert_eq!(batch.selected_count, 2);
    assert_eq!(batch.actions[0].id, "archive");

    assert_eq!(t.run_batch("archive"), Some(2));
    assert_eq!(*seen.lock().unwrap(), [3, 60]);
    assert_eq!(t.run_batch("missing"), None);
}

#[test]
fn test_sort_filter_and_paginate() {
    let mut t = table(Arc::new(MemoryStore::new()));
    t.toggle_sort("id");
    t.toggle_sort("id");
    assert_eq!(t.sort().unwrap().direction, SortDirection::Descending);
    assert_eq!(t.view().rows[0].id, "60");

    t.last_page();
    t.set_column_filter("role", Some("ADMIN".into()));
    assert_eq!(t.filtered_len(), 20);
    assert_eq!(t.pagination().page(), 1);
    assert_eq!(t.view().rows[0].id, "60");

    t.set_search("user 0");
    assert_eq!(t.filtered_len(), 3);

    t.clear_filters();
    t.set_data(users(10));
    assert_eq!(t.pagination().total_pages(), 1);
    assert_eq!(t.view().page.end_index, 10);
}

#[test]
fn test_data_shrink_clamps_page_keeps_selection() {
    let mut t = table(Arc::new(MemoryStore::new()));
    t.last_page();
    t.toggle_row("55");
    t.set_data(users(30));
    assert_eq!(t.pagination().page(), 2);
    assert!(t.selection().is_selected("55"));
}

#[test]
fn test_sort_aware_header() {
    let mut t = DataTable::new(
        vec![Column::new(
            "name",
            gridline::HeaderSpec::dynamic(|sort| match sort.map(|s| s.direction) {
                Some(SortDirection::Ascending) => "Name ▲".to_string(),
                Some(SortDirection::Descending) => "Name ▼".to_string(),
                None => "Name".to_string(),
            }),
            |u: &User, _| u.name.clone(),
        )
        .sortable("name")],
        |u: &User| u.id.to_string(),
        DataTableOptions::new("headers"),
        Arc::new(MemoryStore::new()),
    );
    t.set_data(users(3));
    assert_eq!(t.view().columns[0].header, "Name");
    t.toggle_sort("name");
    assert_eq!(t.view().columns[0].header, "Name ▲");
    assert_eq!(t.view().header_check, None);
}
