//! Book use-case service.
//!
//! # Responsibility
//! - Provide the five catalogue operations the HTTP layer calls.
//! - Delegate persistence to a [`BookRepository`] implementation.
//!
//! # Invariants
//! - `update_book` never changes the stored `id`.
//! - `update_book` performs no write when the target is absent.
//! - Read-modify-write in `update_book` is not atomic against a concurrent
//!   delete of the same id.

use crate::model::book::{Book, BookId};
use crate::repo::book_repo::{BookRepository, RepoResult};

/// Use-case facade over a book repository.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores `book` under its own id, overwriting any existing record.
    pub fn add_book(&self, book: &Book) -> RepoResult<Book> {
        self.repo.insert_or_replace(book)
    }

    pub fn get_all_books(&self) -> RepoResult<Vec<Book>> {
        self.repo.find_all()
    }

    pub fn get_book_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.repo.find(id)
    }

    /// Copies the descriptive fields of `details` onto the record at `id`.
    ///
    /// # Contract
    /// - `details.id` is ignored; the path id is kept.
    /// - Returns `Ok(None)` without writing when `id` is unknown.
    pub fn update_book(&self, id: BookId, details: Book) -> RepoResult<Option<Book>> {
        let Some(mut book) = self.repo.find(id)? else {
            return Ok(None);
        };
        book.apply_details(details);
        self.repo.insert_or_replace(&book).map(Some)
    }

    /// Deletes the record at `id`. Succeeds even if nothing was stored.
    pub fn delete_book_by_id(&self, id: BookId) -> RepoResult<()> {
        self.repo.delete(id)
    }
}
