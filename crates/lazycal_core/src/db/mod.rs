//! SQLite storage bootstrap for the event persistence adapter.
//!
//! # Responsibility
//! - Open the calendar database file, creating its directory when missing.
//! - Bring the `events` and `snapshot_saves` schema up to date before any
//!   event row is read or written.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A database written by a newer binary is refused and left untouched.
//! - A failed migration rolls back every step of the same open call.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use migrations::schema_version;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The directory that should hold the database file could not be created.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// One schema step failed; nothing from the open call was committed.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    NewerSchema {
        found: u32,
        supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create calendar directory {}: {source}",
                path.display()
            ),
            Self::Migration { version, source } => {
                write!(f, "calendar schema step {version} failed: {source}")
            }
            Self::NewerSchema { found, supported } => write!(
                f,
                "calendar schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDir { source, .. } => Some(source),
            Self::Migration { source, .. } => Some(source),
            Self::NewerSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
