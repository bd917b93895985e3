use std::fs::{create_dir_all, File};
use std::io;
use std::path::Path;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::config::DbConnectionConfig;
use crate::error::DbError;

pub type DbPool = SqlitePool;

/// Open a SQLite pool, creating the database file first when it is missing.
///
/// In-memory URLs are pinned to one long-lived connection; every new
/// connection to `sqlite::memory:` would otherwise see an empty database.
pub async fn create_pool(config: &DbConnectionConfig) -> Result<DbPool, DbError> {
    let url = config.url.trim();
    if url.is_empty() {
        return Err(DbError::EmptyDatabaseUrl);
    }

    let opts = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        ensure_sqlite_db_file_exists(url)?;
        let mut opts = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .min_connections(config.min_connections.min(config.max_connections));
        if let Some(idle) = config.idle_timeout() {
            opts = opts.idle_timeout(idle);
        }
        opts
    };

    debug!(url, in_memory = config.is_in_memory(), "opening sqlite pool");
    opts.acquire_timeout(config.connect_timeout())
        .connect(url)
        .await
        .map_err(Into::into)
}

/// Strip the scheme and query from a SQLite URL, leaving the file path.
fn sqlite_file_path(url: &str) -> Option<&str> {
    let mut path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    path = path.strip_prefix("file:").unwrap_or(path);
    if let Some(idx) = path.find('?') {
        path = &path[..idx];
    }

    let path = path.trim();
    (!path.is_empty()).then_some(path)
}

fn ensure_sqlite_db_file_exists(database_url: &str) -> Result<(), DbError> {
    let Some(clean_path) = sqlite_file_path(database_url) else {
        return Ok(());
    };

    let db_path = Path::new(clean_path);
    if let Some(parent) = db_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        create_dir_all(parent).map_err(|e| {
            DbError::FileCreation(format!(
                "failed to create parent directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    if !db_path.exists() {
        File::create(db_path).map_err(|e| {
            let msg = if e.kind() == io::ErrorKind::PermissionDenied {
                format!("permission denied creating '{}': {e}", db_path.display())
            } else {
                format!("failed to create DB file '{}': {e}", db_path.display())
            };
            DbError::FileCreation(msg)
        })?;
    }

    Ok(())
}
