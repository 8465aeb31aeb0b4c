use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "gridline")]
#[command(about = "Browse tables and logs with persisted layouts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Layout database. Defaults to the platform data directory.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Verbosity of our own log file.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevelArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render a JSON array of objects as a paginated table.
    Table(TableArgs),

    /// Show the log files of a directory.
    Logs(LogsArgs),

    /// Manage archived logs under `<dir>/archive`.
    Archives {
        dir: PathBuf,
        #[command(subcommand)]
        action: ArchiveAction,
    },

    /// Inspect or reset a stored table layout.
    Layout {
        /// Storage key of the table.
        key: String,
        #[command(subcommand)]
        action: LayoutAction,
    },
}

#[derive(clap::Args)]
pub struct TableArgs {
    /// JSON file holding an array of objects.
    pub file: PathBuf,

    /// Storage key for the layout. Defaults to the file stem.
    #[arg(long)]
    pub key: Option<String>,

    /// Field used as the row id.
    #[arg(long, default_value = "id")]
    pub id_field: String,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Change (and remember) the page size.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Sort by a column; prefix with `-` for descending.
    #[arg(long, allow_hyphen_values = true)]
    pub sort: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    /// Exact-value filter, `column=value`. Repeatable.
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Toggle a column's visibility. Repeatable.
    #[arg(long)]
    pub toggle: Vec<String>,

    /// Move a column, `column:left` or `column:right`. Repeatable.
    #[arg(long = "move")]
    pub moves: Vec<String>,

    /// Set a column width in pixels, `column=width`. Repeatable.
    #[arg(long)]
    pub width: Vec<String>,

    /// Columns hidden until toggled.
    #[arg(long)]
    pub hidden: Vec<String>,

    /// Columns that can never be hidden or moved.
    #[arg(long)]
    pub locked: Vec<String>,
}

#[derive(clap::Args)]
pub struct LogsArgs {
    /// Directory holding `<category>.log` files.
    pub dir: PathBuf,

    #[arg(long, default_value = "app")]
    pub category: String,

    /// Only these levels. Repeatable.
    #[arg(long)]
    pub level: Vec<String>,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub newest_first: bool,

    /// Keep at most this many entries.
    #[arg(long, default_value_t = 1000)]
    pub max: usize,

    #[arg(long, default_value = "text")]
    pub format: ExportArg,

    /// Keep running and print new entries as they are appended.
    #[arg(long)]
    pub follow: bool,

    /// Poll interval in milliseconds while following.
    #[arg(long, default_value_t = 1000)]
    pub interval: u64,

    /// Truncate the category's log file.
    #[arg(long)]
    pub clear: bool,
}

#[derive(Subcommand)]
pub enum ArchiveAction {
    List,
    /// Print an archive.
    Show { name: String },
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum LayoutAction {
    /// Print every stored aspect.
    Show,
    /// Forget the stored layout.
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportArg {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for log::LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}
