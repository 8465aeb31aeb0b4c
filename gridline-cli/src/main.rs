mod cli;
mod commands;
mod error;
mod paths;
mod render;
mod source;

use std::fs::{self, File};

use clap::Parser;
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::cli::Cli;

fn init_logging(level: LevelFilter) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Warning: logger not initialized: {e}");
            }
        }
        Err(e) => eprintln!("Warning: cannot create {}: {e}", path.display()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.into());
    log::info!("gridline {} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = commands::run(cli).await {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
