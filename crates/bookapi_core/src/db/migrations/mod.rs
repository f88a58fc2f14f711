//! Embedded schema migrations for the book store.
//!
//! # Responsibility
//! - Keep the ordered list of SQL scripts shipped with this binary.
//! - Bring a connection up to the latest schema in one transaction.
//!
//! # Invariants
//! - Script versions start at 1 and increase by exactly one.
//! - `PRAGMA user_version` always equals the last applied script version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "init_book_table",
    sql: include_str!("0001_init.sql"),
}];

/// Returns the newest schema version this binary knows how to run against.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded on `conn`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Applies every script newer than the connection's `user_version`.
///
/// A database stamped with a version above [`latest_version`] was written
/// by a newer binary and is refused rather than downgraded.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let to_version = latest_version();

    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }
    if from_version == to_version {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(())
}
