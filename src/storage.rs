//! Durable persistence for cargos and their handling histories.
//!
//! Everything lives in a single `SQLite` database:
//!
//! ```text
//! cargo            # One row per booked cargo (route specification)
//! leg              # The cargo's current itinerary, ordered by position
//! handling_event   # Append-only; `seq` is registration order
//! ```
//!
//! Delivery snapshots are not stored. Loading a cargo derives its delivery
//! from the stored itinerary and handling history.

mod cargo;
mod handling;

use std::{fs, io, path::Path, path::PathBuf};

use jiff::Timestamp;
use parking_lot::Mutex;
use rusqlite::Connection;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS cargo (
        tracking_id      TEXT PRIMARY KEY,
        origin           TEXT NOT NULL,
        spec_origin      TEXT NOT NULL,
        destination      TEXT NOT NULL,
        arrival_deadline TEXT
    );
    CREATE TABLE IF NOT EXISTS leg (
        tracking_id     TEXT NOT NULL REFERENCES cargo (tracking_id),
        position        INTEGER NOT NULL,
        voyage_number   TEXT NOT NULL,
        load_location   TEXT NOT NULL,
        unload_location TEXT NOT NULL,
        load_time       TEXT NOT NULL,
        unload_time     TEXT NOT NULL,
        PRIMARY KEY (tracking_id, position)
    );
    CREATE TABLE IF NOT EXISTS handling_event (
        seq           INTEGER PRIMARY KEY AUTOINCREMENT,
        tracking_id   TEXT NOT NULL,
        event_type    TEXT NOT NULL,
        location      TEXT NOT NULL,
        voyage_number TEXT,
        registered_at TEXT NOT NULL,
        completed_at  TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS handling_event_by_cargo
        ON handling_event (tracking_id, seq);
";

/// `SQLite`-backed cargo and handling event storage.
///
/// The single connection is guarded by a mutex, so every repository call
/// runs alone.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    /// Opens (creating if needed) the database at `path`.
    ///
    /// Parent directories are created if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Returns the default database path: `~/.freight/freight.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".freight").join("freight.sqlite"))
    }
}

fn parse_timestamp(value: &str, column: &str) -> Result<Timestamp> {
    value
        .parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("freight.sqlite");

        Storage::open(&path).unwrap();

        assert!(path.is_file());
    }

    #[test]
    fn reopening_keeps_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("freight.sqlite");

        drop(Storage::open(&path).unwrap());
        Storage::open(&path).unwrap();
    }

    #[test]
    fn parse_timestamp_reports_column() {
        let err = parse_timestamp("yesterday", "load_time").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(ref m) if m.contains("load_time")));
    }
}
