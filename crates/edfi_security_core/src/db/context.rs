//! Request-scoped security contexts.
//!
//! A context is a plain SQLite connection. Repositories create one per call
//! and drop it before returning, so no connection outlives a lookup.

use super::open::open_db_read_only;
use super::DbResult;
use log::debug;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Creates fresh database contexts for repository calls.
pub trait SecurityContextFactory {
    fn create_context(&self) -> DbResult<Connection>;
}

/// Opens read-only contexts against one provisioned SQLite file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteSecurityContextFactory {
    path: PathBuf,
}

impl SqliteSecurityContextFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecurityContextFactory for SqliteSecurityContextFactory {
    fn create_context(&self) -> DbResult<Connection> {
        debug!("event=context_create module=db status=start");
        open_db_read_only(&self.path)
    }
}

impl<F: SecurityContextFactory + ?Sized> SecurityContextFactory for &F {
    fn create_context(&self) -> DbResult<Connection> {
        (**self).create_context()
    }
}
