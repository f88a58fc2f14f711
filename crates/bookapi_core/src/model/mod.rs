//! Domain model for the book catalogue.
//!
//! # Responsibility
//! - Define the single record shape exchanged over HTTP and persisted in
//!   `book_table`.
//!
//! # Invariants
//! - `Book::id` is the only identity; there are no relationships.

pub mod book;
