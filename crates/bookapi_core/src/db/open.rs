//! Connection bootstrap for the SQLite book store.
//!
//! # Responsibility
//! - Open file-backed or in-memory connections.
//! - Apply connection settings and pending migrations before handing a
//!   connection to callers.
//!
//! # Invariants
//! - Returned connections are fully migrated.
//! - Every open attempt logs exactly one terminal `db_open` event.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) a SQLite database file and migrates it.
///
/// # Side effects
/// - Creates the file when absent.
/// - Emits `db_open` log events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory database and migrates it.
///
/// Contents vanish when the connection is dropped; intended for tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = open()
        .map_err(|err| ("db_open_failed", DbError::from(err)))
        .and_then(|mut conn| match bootstrap_connection(&mut conn) {
            Ok(()) => Ok(conn),
            Err(err) => Err(("db_bootstrap_failed", err)),
        });

    match result {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err((error_code, err)) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code={error_code} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
