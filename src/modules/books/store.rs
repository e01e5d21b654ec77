//! Data access for the `books` table.

use bookstore_http::AppError;
use sqlx::SqlitePool;
use thiserror::Error;

use super::models::{Book, BookData};

const COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("There is no book with an isbn '{isbn}'")]
    NotFound { isbn: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    fn not_found(isbn: &str) -> Self {
        Self::NotFound {
            isbn: isbn.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::not_found(err.to_string()),
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

/// Book data access over a shared pool.
#[derive(Debug, Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All books in insertion order.
    pub async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {COLUMNS} FROM books ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn find_one(&self, isbn: &str) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {COLUMNS} FROM books WHERE isbn = ?"))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(isbn))
    }

    /// Insert a new book. An existing isbn is a database error, never an
    /// overwrite.
    pub async fn create(&self, book: &Book) -> StoreResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books ({COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(isbn = %created.isbn, "book created");
        Ok(created)
    }

    /// Overwrite every mutable field of the book with this isbn.
    pub async fn update(&self, isbn: &str, data: &BookData) -> StoreResult<Book> {
        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET amazon_url = ?, author = ?, language = ?, pages = ?,
                publisher = ?, title = ?, year = ?
            WHERE isbn = ?
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&data.amazon_url)
        .bind(&data.author)
        .bind(&data.language)
        .bind(data.pages)
        .bind(&data.publisher)
        .bind(&data.title)
        .bind(data.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found(isbn))?;

        tracing::debug!(%isbn, "book updated");
        Ok(updated)
    }

    pub async fn remove(&self, isbn: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(isbn));
        }

        tracing::debug!(%isbn, "book removed");
        Ok(())
    }
}
