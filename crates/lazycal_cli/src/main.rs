//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `lazycal_core` linkage and database access outside Flutter.
//! - Print the agenda of the configured database in a stable format.

use lazycal_core::{
    format_date_heading, sorted_summary, CoreConfig, EventPersistence, SqliteEventPersistence,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("lazycal_core ping={}", lazycal_core::ping());
    println!("lazycal_core version={}", lazycal_core::core_version());

    match print_agenda() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn print_agenda() -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        let log_dir = log_dir.to_string_lossy();
        lazycal_core::init_logging(config.log_level, &log_dir).map_err(|err| err.to_string())?;
    }

    let port = SqliteEventPersistence::open(&config.db_path).map_err(|err| err.to_string())?;
    println!("database={}", config.db_path.display());
    if let Some(record) = port.last_save().map_err(|err| err.to_string())? {
        println!(
            "last_save_ms={} dates={} events={}",
            record.saved_at, record.date_count, record.event_count
        );
    }

    let snapshot = port
        .load()
        .map_err(|err| err.to_string())?
        .unwrap_or_default();
    let groups = sorted_summary(&snapshot);
    if groups.is_empty() {
        println!("No events.");
        return Ok(());
    }

    for group in groups {
        println!();
        println!("{}", format_date_heading(group.date));
        for event in &group.events {
            println!(
                "  {}  [{}] {}",
                event.time(),
                event.priority(),
                event.display_title()
            );
        }
    }
    Ok(())
}
