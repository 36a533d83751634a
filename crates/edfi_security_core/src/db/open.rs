//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations on provisioning connections.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - `open_db*` connections have migrations fully applied.
//! - `open_db_read_only` connections are never migrated and refuse writes.

use super::migrations::{apply_migrations, current_user_version, latest_version};
use super::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) a security database file and applies all
/// pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let opened = Connection::open(plain_file_path(path.as_ref()))
        .map_err(DbError::from)
        .and_then(|mut conn| bootstrap_connection(&mut conn).map(|()| conn));
    log_open_outcome("file", started_at, opened)
}

/// Opens an in-memory security database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let opened = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| bootstrap_connection(&mut conn).map(|()| conn));
    log_open_outcome("memory", started_at, opened)
}

/// Opens an existing security database file for reading only.
///
/// # Errors
/// - `DbError::Sqlite` when the file does not exist or cannot be opened.
/// - `DbError::SchemaVersionMismatch` when the file was not provisioned by
///   this build's migrations.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    let conn = Connection::open_with_flags(plain_file_path(path.as_ref()), flags)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    let expected = latest_version();
    let actual = current_user_version(&conn)?;
    if actual != expected {
        error!(
            "event=db_open module=db status=error mode=read_only error_code=schema_mismatch expected={} actual={}",
            expected, actual
        );
        return Err(DbError::SchemaVersionMismatch { expected, actual });
    }

    debug!(
        "event=db_open module=db status=ok mode=read_only duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

/// SQLite reads names beginning with `file:` as URIs even without
/// `SQLITE_OPEN_URI` (bundled builds set `SQLITE_USE_URI`). Anchoring
/// relative paths under `.` keeps every path a plain file name.
fn plain_file_path(path: &Path) -> PathBuf {
    if path.is_relative() {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}

fn log_open_outcome(
    mode: &str,
    started_at: Instant,
    opened: DbResult<Connection>,
) -> DbResult<Connection> {
    match &opened {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code={} error={}",
            mode,
            started_at.elapsed().as_millis(),
            open_error_code(err),
            err
        ),
    }
    opened
}

fn open_error_code(err: &DbError) -> &'static str {
    match err {
        DbError::Sqlite(_) => "db_open_failed",
        DbError::UnsupportedSchemaVersion { .. } | DbError::SchemaVersionMismatch { .. } => {
            "db_bootstrap_failed"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::plain_file_path;
    use std::path::Path;

    #[test]
    fn relative_paths_never_start_with_uri_scheme() {
        let anchored = plain_file_path(Path::new("file:security.sqlite3?mode=memory"));
        assert!(!anchored.to_string_lossy().starts_with("file:"));
        assert!(anchored.ends_with("file:security.sqlite3?mode=memory"));
    }

    #[test]
    fn absolute_paths_are_unchanged() {
        let path = Path::new("/var/lib/security.sqlite3");
        assert_eq!(plain_file_path(path), path);
    }
}
