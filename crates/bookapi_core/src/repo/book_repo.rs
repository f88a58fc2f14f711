//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose the four persistence operations the service depends on.
//! - Keep every SQL statement for `book_table` in this file.
//!
//! # Invariants
//! - `insert_or_replace` replaces all columns of an existing row.
//! - `find` reports absence as `Ok(None)`, never as an error.
//! - `delete` succeeds whether or not the row existed.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::book::{Book, BookId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_TABLE: &str = "book_table";
const BOOK_COLUMNS: [&str; 6] = ["id", "title", "author", "publisher", "year", "genre"];

const BOOK_SELECT_SQL: &str = "SELECT id, title, author, publisher, year, genre FROM book_table";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error raised by book persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite or bootstrap failure.
    Db(DbError),
    /// Shared connection could not be acquired.
    Unavailable(String),
    /// Connection schema version differs from what this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(reason) => write!(f, "book store unavailable: {reason}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key-addressed durable store of books.
pub trait BookRepository {
    /// Writes `book` under `book.id`, replacing any previous record.
    fn insert_or_replace(&self, book: &Book) -> RepoResult<Book>;
    fn find(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn find_all(&self) -> RepoResult<Vec<Book>>;
    /// Removes the record if present. Missing ids are not an error.
    fn delete(&self, id: BookId) -> RepoResult<()>;
}

/// SQLite-backed book repository borrowing one connection.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Wraps `conn` without inspecting its schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps `conn` after checking it was opened through [`crate::db::open_db`].
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let columns = table_columns(conn, BOOK_TABLE)?;
        if columns.is_empty() {
            return Err(RepoError::MissingRequiredTable(BOOK_TABLE));
        }
        if let Some(column) = BOOK_COLUMNS
            .into_iter()
            .find(|required| !columns.iter().any(|name| name == required))
        {
            return Err(RepoError::MissingRequiredColumn {
                table: BOOK_TABLE,
                column,
            });
        }

        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn insert_or_replace(&self, book: &Book) -> RepoResult<Book> {
        self.conn.execute(
            "INSERT INTO book_table (id, title, author, publisher, year, genre)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                author = excluded.author,
                publisher = excluded.publisher,
                year = excluded.year,
                genre = excluded.genre;",
            params![
                book.id,
                book.title.as_str(),
                book.author.as_str(),
                book.publisher.as_str(),
                book.year,
                book.genre.as_str(),
            ],
        )?;

        Ok(book.clone())
    }

    fn find(&self, id: BookId) -> RepoResult<Option<Book>> {
        let book = self
            .conn
            .query_row(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"), [id], parse_book_row)
            .optional()?;
        Ok(book)
    }

    fn find_all(&self) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
        let books = stmt
            .query_map([], parse_book_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn delete(&self, id: BookId) -> RepoResult<()> {
        self.conn.execute("DELETE FROM book_table WHERE id = ?1;", [id])?;
        Ok(())
    }
}

fn parse_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        publisher: row.get("publisher")?,
        year: row.get("year")?,
        genre: row.get("genre")?,
    })
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}
