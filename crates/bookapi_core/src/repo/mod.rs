//! Repository layer: the persistence port for books.
//!
//! # Responsibility
//! - Define the data access contract used by the service layer.
//! - Isolate SQLite query details from HTTP and service code.
//!
//! # Invariants
//! - "Not found" is a value (`Ok(None)`), transport failures are errors.

pub mod book_repo;
