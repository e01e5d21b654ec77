//! HTTP handlers for the books module.
//!
//! Every write validates its body before touching the store, so a 400 never
//! follows a partial write.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::{AppError, AppResult};
use bookstore_kernel::RouteCtx;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{Book, BookData, BookResponse, BooksResponse, MessageResponse};
use super::schemas;
use super::store::BookStore;

/// Build the books router. The collection answers with and without a
/// trailing slash.
pub fn router(ctx: &RouteCtx<'_>) -> Router {
    tracing::debug!(
        target: "bookstore.routes",
        base_path = ctx.base_path,
        "registering books routes"
    );

    let store = BookStore::new(ctx.db.clone());
    let collection = format!("{}/", ctx.base_path);
    let item = format!("{}/{{isbn}}", ctx.base_path);

    Router::new()
        .route(ctx.base_path, get(list_books).post(create_book))
        .route(&collection, get(list_books).post(create_book))
        .route(&item, get(get_book).put(update_book).delete(delete_book))
        .with_state(store)
}

/// GET / => {books: [book, ...]}
async fn list_books(State(store): State<BookStore>) -> AppResult<Json<BooksResponse>> {
    let books = store.find_all().await?;
    Ok(Json(BooksResponse { books }))
}

/// GET /{isbn} => {book: book}
async fn get_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookResponse>> {
    let book = store.find_one(&isbn).await?;
    Ok(Json(BookResponse { book }))
}

/// POST / bookData => 201 {book: newBook}
async fn create_book(
    State(store): State<BookStore>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let Json(mut payload) = payload?;
    bookstore_schema::validate(&payload, schemas::create_schema()?)?;
    schemas::normalize_integers(&mut payload)?;
    let book: Book = decode(payload)?;

    let book = store.create(&book).await?;
    tracing::info!(isbn = %book.isbn, "book created");

    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

/// PUT /{isbn} bookData => {book: updatedBook}
async fn update_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<BookResponse>> {
    let Json(mut payload) = payload?;
    bookstore_schema::validate(&payload, schemas::update_schema()?)?;
    schemas::normalize_integers(&mut payload)?;
    if let Some(body_isbn) = payload.get("isbn").and_then(Value::as_str) {
        if body_isbn != isbn {
            tracing::debug!(path_isbn = %isbn, %body_isbn, "body isbn ignored in favour of path");
        }
    }
    let data: BookData = decode(payload)?;

    let book = store.update(&isbn, &data).await?;
    tracing::info!(isbn = %book.isbn, "book updated");

    Ok(Json(BookResponse { book }))
}

/// DELETE /{isbn} => {message: "Book deleted"}
async fn delete_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    // Absent rows and rows removed concurrently both surface as NotFound.
    store.find_one(&isbn).await?;
    store.remove(&isbn).await?;
    tracing::info!(%isbn, "book deleted");

    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}

/// Typed view of a body that already passed schema validation and integer
/// normalization.
fn decode<T: DeserializeOwned>(payload: Value) -> AppResult<T> {
    serde_json::from_value(payload).map_err(|e| AppError::bad_request(e.to_string()))
}
