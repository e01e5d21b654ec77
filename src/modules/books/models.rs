use serde::{Deserialize, Serialize};

/// A row of the `books` table; also the JSON shape on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Primary key
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// Every mutable field of a book. The isbn of an update comes from the path,
/// so any isbn in the body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookData {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

impl Book {
    pub fn from_data(isbn: impl Into<String>, data: BookData) -> Self {
        Self {
            isbn: isbn.into(),
            amazon_url: data.amazon_url,
            author: data.author,
            language: data.language,
            pages: data.pages,
            publisher: data.publisher,
            title: data.title,
            year: data.year,
        }
    }
}

/// `{"book": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: Book,
}

/// `{"books": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
