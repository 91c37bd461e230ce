//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured store and report its schema version and row counts.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `taskboard [config.toml]`. `TASKBOARD_*` variables override the file.

use std::process::ExitCode;
use taskboard_core::{core_version, init_logging, Store, StoreConfig};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("taskboard: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let store = Store::open(&config)?;
    let stats = store.stats()?;
    println!("taskboard_core version={}", core_version());
    println!("schema_version={}", store.schema_version()?);
    println!(
        "users={} tasks={} tags={}",
        stats.users, stats.tasks, stats.tags
    );
    log::info!(
        "event=cli_report module=cli status=ok users={} tasks={} tags={}",
        stats.users,
        stats.tasks,
        stats.tags
    );
    Ok(())
}
