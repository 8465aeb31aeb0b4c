//! Subcommand implementations.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gridline::logs::ExportFormat;
use gridline::table::{MenuCommand, SortDirection};
use gridline::toast::{Toast, ToastLevel};
use gridline::{
    Aspect, Column, DataTable, DataTableOptions, LogEntry, LogLevel, LogViewer,
    LogViewerConfig, SqliteStore, TableStateStore,
};
use serde_json::{Map, Value};

use crate::cli::{ArchiveAction, Cli, Command, ExportArg, LayoutAction, LogsArgs, TableArgs};
use crate::error::CliError;
use crate::paths;
use crate::render;
use crate::source::FileLogSource;

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let color = std::io::stdout().is_terminal();
    match cli.command {
        Command::Table(args) => table(open_store(cli.db)?, args, color),
        Command::Logs(args) => logs(args, color).await,
        Command::Archives { dir, action } => archives(dir, action).await,
        Command::Layout { key, action } => layout(open_store(cli.db)?, &key, action),
    }
}

fn open_store(db: Option<PathBuf>) -> Result<Arc<SqliteStore>, CliError> {
    let path = match db {
        Some(path) => path,
        None => paths::layout_db().ok_or(CliError::NoDataDir)?,
    };
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    log::debug!("opening layout db {}", path.display());
    Ok(Arc::new(SqliteStore::open(&path)?))
}

/// Print queued toasts. Returns the first error message, if any.
fn report(toasts: Vec<Toast>) -> Option<String> {
    let mut first_error = None;
    for toast in toasts {
        eprintln!("{}", toast.message);
        if toast.level == ToastLevel::Error && first_error.is_none() {
            first_error = Some(toast.message);
        }
    }
    first_error
}

// =============================================================================
// table
// =============================================================================

/// One JSON object of the input file.
struct Row {
    index: usize,
    fields: Map<String, Value>,
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => value_text(a).cmp(&value_text(b)),
    }
}

fn load_rows(args: &TableArgs) -> Result<(Vec<String>, Vec<Row>), CliError> {
    let text = fs::read_to_string(&args.file)?;
    let Value::Array(items) = serde_json::from_str::<Value>(&text)? else {
        return Err(CliError::invalid("expected a JSON array of objects"));
    };

    let mut keys: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(CliError::invalid(format!("item {index} is not an object")));
        };
        for key in fields.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        rows.push(Row { index, fields });
    }
    Ok((keys, rows))
}

fn build_columns(keys: &[String], args: &TableArgs) -> Vec<Column<Row>> {
    keys.iter()
        .map(|key| {
            let cell_key = key.clone();
            let sort_key = key.clone();
            let mut column = Column::new(key.clone(), key.clone(), move |row: &Row, _| {
                value_text(row.fields.get(&cell_key))
            })
            .sortable(key.clone())
            .sort_by(move |a: &Row, b: &Row| {
                compare_values(a.fields.get(&sort_key), b.fields.get(&sort_key))
            });
            if args.hidden.contains(key) {
                column = column.hidden_by_default();
            }
            if args.locked.contains(key) {
                column = column.locked();
            }
            column
        })
        .collect()
}

fn split_pair<'a>(spec: &'a str, sep: char, what: &str) -> Result<(&'a str, &'a str), CliError> {
    spec.split_once(sep)
        .ok_or_else(|| CliError::invalid(format!("invalid {what} `{spec}`, expected a{sep}b")))
}

fn table(store: Arc<SqliteStore>, args: TableArgs, color: bool) -> Result<(), CliError> {
    let (keys, rows) = load_rows(&args)?;
    let known = |id: &str| -> Result<(), CliError> {
        if keys.iter().any(|k| k == id) {
            Ok(())
        } else {
            Err(CliError::invalid(format!("unknown column `{id}`")))
        }
    };

    let storage_key = match &args.key {
        Some(key) => key.clone(),
        None => args
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "table".to_string()),
    };
    let id_field = args.id_field.clone();
    let mut table = DataTable::new(
        build_columns(&keys, &args),
        move |row: &Row| match row.fields.get(&id_field) {
            Some(value) => value_text(Some(value)),
            None => row.index.to_string(),
        },
        DataTableOptions::new(storage_key),
        store,
    );
    table.set_data(rows);

    for id in &args.toggle {
        known(id)?;
        table.apply_menu(&MenuCommand::ToggleColumn(id.clone()));
    }
    for spec in &args.moves {
        let (id, direction) = split_pair(spec, ':', "move")?;
        known(id)?;
        let command = match direction {
            "left" => MenuCommand::MoveLeft(id.to_string()),
            "right" => MenuCommand::MoveRight(id.to_string()),
            other => return Err(CliError::invalid(format!("unknown direction `{other}`"))),
        };
        table.apply_menu(&command);
    }
    for spec in &args.width {
        let (id, width) = split_pair(spec, '=', "width")?;
        known(id)?;
        let width: u32 = width
            .parse()
            .map_err(|_| CliError::invalid(format!("invalid width `{width}`")))?;
        table.resize_mut().set_width(id, width);
    }
    if let Some(size) = args.page_size {
        table.set_page_size(size);
    }

    for spec in &args.filters {
        let (id, value) = split_pair(spec, '=', "filter")?;
        known(id)?;
        table.set_column_filter(id, Some(value.to_string()));
    }
    if let Some(query) = &args.search {
        table.set_search(query.clone());
    }
    if let Some(sort) = &args.sort {
        let (id, descending) = match sort.strip_prefix('-') {
            Some(id) => (id, true),
            None => (sort.as_str(), false),
        };
        known(id)?;
        table.toggle_sort(id);
        if descending && table.sort().map(|s| s.direction) == Some(SortDirection::Ascending) {
            table.toggle_sort(id);
        }
    }
    table.set_page(args.page);

    for line in render::table(&table.view(), color) {
        println!("{line}");
    }
    Ok(())
}

// =============================================================================
// logs
// =============================================================================

async fn logs(args: LogsArgs, color: bool) -> Result<(), CliError> {
    let config = LogViewerConfig::default()
        .with_category(args.category.clone())
        .with_max_entries(Some(args.max))
        .with_newest_first(args.newest_first && !args.follow)
        .with_follow(false)
        .with_poll_interval(Duration::from_millis(args.interval));
    let viewer = LogViewer::new(Arc::new(FileLogSource::new(&args.dir)), config);

    if args.clear {
        viewer.clear_logs().await;
        return match report(viewer.take_toasts()) {
            Some(error) => Err(CliError::invalid(error)),
            None => Ok(()),
        };
    }

    viewer.set_levels(args.level.iter().map(|l| LogLevel::parse(l)));
    if let Some(query) = &args.search {
        viewer.set_search(query.clone());
    }
    viewer.refresh().await;

    let format = match args.format {
        ExportArg::Text => ExportFormat::Text,
        ExportArg::Json => ExportFormat::JsonLines,
    };
    let mut printed = HashMap::new();
    print_new(&viewer, format, color, &mut printed)?;

    if args.follow {
        viewer.subscribe_live();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = tokio::time::sleep(Duration::from_millis(args.interval)) => {}
            }
            print_new(&viewer, format, color, &mut printed)?;
        }
        viewer.shutdown();
    }
    Ok(())
}

/// Output still owed for one entry.
#[derive(Debug, PartialEq)]
enum Unprinted {
    /// Never printed.
    Entry(LogEntry),
    /// Printed before; stack frames from the given line on arrived since.
    Frames(LogEntry, usize),
}

fn stack_len(entry: &LogEntry) -> usize {
    entry.stack().map_or(0, |stack| stack.lines().count())
}

/// Diff `entries` against what was printed, updating `printed` (id to
/// stack lines printed). Ids no longer present are forgotten.
fn unprinted(entries: Vec<LogEntry>, printed: &mut HashMap<String, usize>) -> Vec<Unprinted> {
    let live: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    printed.retain(|id, _| live.contains(id.as_str()));

    let mut out = Vec::new();
    for entry in entries {
        let frames = stack_len(&entry);
        match printed.insert(entry.id.clone(), frames) {
            None => out.push(Unprinted::Entry(entry)),
            Some(seen) if seen < frames => out.push(Unprinted::Frames(entry, seen)),
            Some(_) => {}
        }
    }
    out
}

/// Print visible entries, and frames appended to printed ones.
fn print_new(
    viewer: &LogViewer,
    format: ExportFormat,
    color: bool,
    printed: &mut HashMap<String, usize>,
) -> Result<(), CliError> {
    for item in unprinted(viewer.visible_entries(), printed) {
        match (format, item) {
            (ExportFormat::Text, Unprinted::Entry(entry)) => {
                println!("{}", render::log_entry(&entry, color));
            }
            (ExportFormat::Text, Unprinted::Frames(entry, from)) => {
                let stack = entry.stack().unwrap_or_default();
                for line in stack.lines().skip(from) {
                    println!("{}", render::frame(line, color));
                }
            }
            // JSON consumers key by id; a grown entry is emitted again.
            (ExportFormat::JsonLines, Unprinted::Entry(entry) | Unprinted::Frames(entry, _)) => {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
    }
    Ok(())
}

// =============================================================================
// archives
// =============================================================================

async fn archives(dir: PathBuf, action: ArchiveAction) -> Result<(), CliError> {
    let viewer = LogViewer::new(Arc::new(FileLogSource::new(dir)), LogViewerConfig::default());

    match action {
        ArchiveAction::List => {
            viewer.show_archives().await;
            for file in viewer.archives() {
                println!(
                    "{:<40} {:>10}  {}",
                    file.name,
                    file.size,
                    file.modified.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ArchiveAction::Show { name } => {
            if let Some(bytes) = viewer.download_archive(&name).await {
                print!("{}", String::from_utf8_lossy(&bytes));
            }
        }
        ArchiveAction::Delete { name } => {
            viewer.delete_archive(&name).await;
        }
    }

    match report(viewer.take_toasts()) {
        Some(error) => Err(CliError::invalid(error)),
        None => Ok(()),
    }
}

// =============================================================================
// layout
// =============================================================================

fn layout(store: Arc<SqliteStore>, key: &str, action: LayoutAction) -> Result<(), CliError> {
    let layout = TableStateStore::new(store, key);
    match action {
        LayoutAction::Show => {
            for aspect in Aspect::ALL {
                let value = layout
                    .load::<Value>(aspect)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<28} {value}", aspect.key(key));
            }
        }
        LayoutAction::Reset => {
            layout.clear_all();
            println!("Layout `{key}` reset");
        }
    }
    Ok(())
}
