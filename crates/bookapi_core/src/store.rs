//! Shared connection handle used by concurrent request handlers.
//!
//! # Responsibility
//! - Own the single SQLite connection for the process.
//! - Hand out a fully wired [`BookService`] for the duration of one call.
//!
//! # Invariants
//! - Connection access is serialized through a mutex.
//! - A poisoned mutex surfaces as `RepoError::Unavailable`, never a panic.

use crate::repo::book_repo::{RepoError, RepoResult, SqliteBookRepository};
use crate::service::book_service::BookService;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Cloneable handle to the process-wide book database.
#[derive(Clone)]
pub struct BookStore {
    conn: Arc<Mutex<Connection>>,
}

impl BookStore {
    /// Takes ownership of a connection returned by [`crate::db::open_db`].
    ///
    /// Fails if the connection is not at the expected schema.
    pub fn new(conn: Connection) -> RepoResult<Self> {
        SqliteBookRepository::try_new(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against a service bound to the shared connection.
    ///
    /// Blocks while another caller holds the connection.
    pub fn with_service<T>(
        &self,
        f: impl FnOnce(&BookService<SqliteBookRepository<'_>>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| RepoError::Unavailable("connection mutex poisoned".to_string()))?;
        let service = BookService::new(SqliteBookRepository::new(&conn));
        f(&service)
    }
}
