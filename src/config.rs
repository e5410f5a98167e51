//! Freight configuration.
//!
//! Loaded from `~/.freight/config.toml`. A missing file means defaults.
//!
//! The database path is resolved through a chain:
//!
//! 1. `--database <path>`: explicit per-command override
//! 2. `FREIGHT_DATABASE` env var: process/session level
//! 3. `database` in `~/.freight/config.toml`
//! 4. `~/.freight/freight.sqlite`

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::{Deserialize, Serialize};

use crate::storage::Storage;

/// Environment variable overriding the configured database path.
pub const DATABASE_ENV: &str = "FREIGHT_DATABASE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Path to the `SQLite` database.
    pub database: Option<PathBuf>,

    /// Default tracing filter, used when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}

impl Config {
    /// Load config from `~/.freight/config.toml`, or defaults if it doesn't exist.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.freight/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".freight").join("config.toml"))
    }

    /// Resolve the database path from the chain above.
    pub fn resolve_database(&self, explicit: Option<&Path>) -> Result<PathBuf, String> {
        let from_env = env::var_os(DATABASE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_database_with(explicit, from_env)
    }

    fn resolve_database_with(
        &self,
        explicit: Option<&Path>,
        from_env: Option<PathBuf>,
    ) -> Result<PathBuf, String> {
        // 1. Explicit --database flag.
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        // 2. FREIGHT_DATABASE environment variable.
        if let Some(path) = from_env {
            return Ok(path);
        }

        // 3. ~/.freight/config.toml.
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }

        Storage::default_path().ok_or_else(|| "could not determine home directory".to_string())
    }
}
