//! Shared command utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tally_core::db::Database;
use tracing::debug;

/// Database path: explicit flag / `TALLY_DB_PATH`, else the platform data dir
pub fn resolve_db_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => default_db_path(),
    }
}

/// `~/.local/share/tally/tally.db` on Linux, `./tally.db` if there is no data dir
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tally").join("tally.db"))
        .unwrap_or_else(|| PathBuf::from("tally.db"))
}

/// Open the database, creating its directory on first use
pub fn open_db(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }

    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    debug!(path = %path_str, "Opening database");

    Database::new(path_str).context("Failed to open database")
}
