//! SQLite storage bootstrap, schema migrations and security contexts.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the security store.
//! - Apply schema migrations in deterministic order.
//! - Hand out read-only, request-scoped contexts to repositories.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories never read from a database whose schema version differs
//!   from the version this build supports.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod context;
pub mod migrations;
mod open;

pub use context::{SecurityContextFactory, SqliteSecurityContextFactory};
pub use open::{open_db, open_db_in_memory, open_db_read_only};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Read-only contexts cannot migrate, so any version drift is fatal.
    SchemaVersionMismatch { expected: u32, actual: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaVersionMismatch { expected, actual } => write!(
                f,
                "security context requires schema version {expected}, got {actual}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::SchemaVersionMismatch { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
