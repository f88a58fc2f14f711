//! Book HTTP routes.
//!
//! Mounted under `/bookapi` by [`crate::server::build_router`]:
//!
//! - `GET /all` - every book as a JSON array
//! - `GET /:id` - one book, or JSON `null` when absent
//! - `POST /add` - insert-or-replace by body id
//! - `PUT /update/:id` - overwrite descriptive fields, or `null` when absent
//! - `DELETE /delete/:id` - idempotent delete, plain-text confirmation

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use bookapi_core::{Book, BookId, BookService, BookStore, RepoResult, SqliteBookRepository};
use log::{debug, info};

use crate::error::ApiResult;

pub fn book_routes(store: BookStore) -> Router {
    Router::new()
        .route("/all", get(get_all_books))
        .route("/add", post(add_book))
        .route("/update/:id", put(update_book))
        .route("/delete/:id", delete(delete_book))
        .route("/:id", get(get_book_by_id))
        .with_state(store)
}

/// Runs one service call on the blocking pool; SQLite calls must not stall
/// the async workers.
async fn run_blocking<T, F>(store: BookStore, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&BookService<SqliteBookRepository<'_>>) -> RepoResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || store.with_service(f)).await?;
    Ok(result?)
}

async fn get_all_books(State(store): State<BookStore>) -> ApiResult<Json<Vec<Book>>> {
    let books = run_blocking(store, |service| service.get_all_books()).await?;
    debug!("event=book_list module=http status=ok count={}", books.len());
    Ok(Json(books))
}

async fn get_book_by_id(
    State(store): State<BookStore>,
    id: Result<Path<BookId>, PathRejection>,
) -> ApiResult<Json<Option<Book>>> {
    let Path(id) = id?;
    let book = run_blocking(store, move |service| service.get_book_by_id(id)).await?;
    debug!(
        "event=book_get module=http status=ok id={id} found={}",
        book.is_some()
    );
    Ok(Json(book))
}

async fn add_book(
    State(store): State<BookStore>,
    body: Result<Json<Book>, JsonRejection>,
) -> ApiResult<Json<Book>> {
    let Json(book) = body?;
    info!(
        "event=book_add module=http status=start id={} title_chars={}",
        book.id,
        book.title.chars().count()
    );
    let stored = run_blocking(store, move |service| service.add_book(&book)).await?;
    Ok(Json(stored))
}

async fn update_book(
    State(store): State<BookStore>,
    id: Result<Path<BookId>, PathRejection>,
    body: Result<Json<Book>, JsonRejection>,
) -> ApiResult<Json<Option<Book>>> {
    let Path(id) = id?;
    let Json(details) = body?;
    let updated = run_blocking(store, move |service| service.update_book(id, details)).await?;
    info!(
        "event=book_update module=http status=ok id={id} found={}",
        updated.is_some()
    );
    Ok(Json(updated))
}

async fn delete_book(
    State(store): State<BookStore>,
    id: Result<Path<BookId>, PathRejection>,
) -> ApiResult<String> {
    let Path(id) = id?;
    run_blocking(store, move |service| service.delete_book_by_id(id)).await?;
    info!("event=book_delete module=http status=ok id={id}");
    Ok(format!("Book deleted with id {id}"))
}
