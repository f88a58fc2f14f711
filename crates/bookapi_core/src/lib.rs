//! Core persistence and use-case logic for the book catalogue API.
//! HTTP concerns live in `bookapi_server`; this crate knows nothing about them.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{Book, BookId};
pub use repo::book_repo::{BookRepository, RepoError, RepoResult, SqliteBookRepository};
pub use service::book_service::BookService;
pub use store::BookStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
