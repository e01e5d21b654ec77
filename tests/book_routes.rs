use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use bookstore_app::modules::books::{Book, BookStore};
use bookstore_app::App;
use bookstore_kernel::settings::{DatabaseSettings, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

const ISBN: &str = "0691161518";

fn sample_book() -> Book {
    Book {
        isbn: ISBN.to_string(),
        amazon_url: "http://a.co/eobPtX2".to_string(),
        author: "Matthew Lane".to_string(),
        language: "english".to_string(),
        pages: 264,
        publisher: "Princeton University Press".to_string(),
        title: "Power-Up: Unlocking the Hidden Mathematics in Video Games".to_string(),
        year: 2017,
    }
}

fn new_book_payload() -> Value {
    json!({
        "isbn": "32794782",
        "amazon_url": "https://taco.com",
        "author": "mctest",
        "language": "english",
        "pages": 1000,
        "publisher": "yeah right",
        "title": "amazing times",
        "year": 2000
    })
}

struct TestApp {
    router: Router,
    store: BookStore,
}

async fn setup() -> TestApp {
    let settings = Settings {
        database: DatabaseSettings::in_memory(),
        ..Settings::default()
    };
    let app = App::bootstrap(settings).await.unwrap();
    let store = BookStore::new(app.db().clone());
    store.create(&sample_book()).await.unwrap();

    TestApp {
        router: app.router(),
        store,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap()
}

#[tokio::test]
async fn list_returns_every_book() {
    let app = setup().await;

    let (status, body) = send(&app.router, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["books"][0]["isbn"], ISBN);

    let (status, with_slash) = send(&app.router, Method::GET, "/books/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(with_slash, body);
}

#[tokio::test]
async fn list_on_empty_store_is_empty_array() {
    let app = setup().await;
    app.store.remove(ISBN).await.unwrap();

    let (status, body) = send(&app.router, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "books": [] }));
}

#[tokio::test]
async fn get_returns_single_book() {
    let app = setup().await;

    let (status, body) = send(&app.router, Method::GET, &format!("/books/{ISBN}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"], serde_json::to_value(sample_book()).unwrap());
}

#[tokio::test]
async fn get_unknown_isbn_is_404() {
    let app = setup().await;

    let (status, body) = send(&app.router, Method::GET, "/books/0691161", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert!(error_message(&body).starts_with("There is no book with an isbn '0691161'"));
}

#[tokio::test]
async fn post_creates_book() {
    let app = setup().await;

    let (status, body) = send(&app.router, Method::POST, "/books/", Some(new_book_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"], new_book_payload());

    let stored = app.store.find_one("32794782").await.unwrap();
    assert_eq!(stored.author, "mctest");
}

#[tokio::test]
async fn posted_book_reads_back_identically() {
    let app = setup().await;

    let (status, created) =
        send(&app.router, Method::POST, "/books", Some(new_book_payload())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fetched) = send(&app.router, Method::GET, "/books/32794782", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["book"], created["book"]);
    assert_eq!(fetched["book"], new_book_payload());
}

#[tokio::test]
async fn post_accepts_whole_float_integers() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload["pages"] = json!(1000.0);

    let (status, body) = send(&app.router, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"]["pages"], json!(1000));
    assert_eq!(app.store.find_one("32794782").await.unwrap().pages, 1000);
}

#[tokio::test]
async fn post_with_integer_beyond_i64_is_400() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload["pages"] = json!(u64::MAX);

    let (status, body) = send(&app.router, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(
        error_message(&body),
        "instance.pages is not of a type(s) integer"
    );
    assert!(app.store.find_one("32794782").await.is_err());
}

#[tokio::test]
async fn post_without_author_is_400() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload.as_object_mut().unwrap().remove("author");

    let (status, body) = send(&app.router, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(error_message(&body).contains("instance requires property \"author\""));
    assert_eq!(body["error"]["details"][0]["field"], "author");
    assert_eq!(body["error"]["details"][0]["error"], "required");

    assert!(matches!(
        app.store.find_one("32794782").await,
        Err(bookstore_app::modules::books::StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn post_with_string_year_is_400() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload["year"] = json!("2000");

    let (status, body) = send(&app.router, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "instance.year is not of a type(s) integer"
    );
}

#[tokio::test]
async fn post_reports_every_violation() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload["publisher"] = json!(42);
    payload.as_object_mut().unwrap().remove("title");

    let (status, body) = send(&app.router, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = error_message(&body);
    assert!(message.contains("instance requires property \"title\""));
    assert!(message.contains("instance.publisher is not of a type(s) string"));
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn post_duplicate_isbn_is_500() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload["isbn"] = json!(ISBN);

    let (status, body) = send(&app.router, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "internal_error");
    assert_eq!(app.store.find_one(ISBN).await.unwrap(), sample_book());
}

#[tokio::test]
async fn post_malformed_json_is_400() {
    let app = setup().await;

    let request = Request::post("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"isbn\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_updates_book() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload["author"] = json!("Matthew Brane");

    let (status, body) = send(&app.router, Method::PUT, &format!("/books/{ISBN}"), Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["isbn"], ISBN);
    assert_eq!(body["book"]["author"], "Matthew Brane");

    assert_eq!(app.store.find_one(ISBN).await.unwrap().author, "Matthew Brane");
    assert!(app.store.find_one("32794782").await.is_err());
}

#[tokio::test]
async fn put_with_bad_pages_is_400_and_leaves_row() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload["pages"] = json!("many");

    let (status, body) = send(&app.router, Method::PUT, &format!("/books/{ISBN}"), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("instance.pages is not of a type(s) integer"));
    assert_eq!(app.store.find_one(ISBN).await.unwrap(), sample_book());
}

#[tokio::test]
async fn put_with_numeric_publisher_is_400_and_leaves_row() {
    let app = setup().await;
    let mut payload = new_book_payload();
    payload["publisher"] = json!(1234);

    let (status, body) =
        send(&app.router, Method::PUT, &format!("/books/{ISBN}"), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "instance.publisher is not of a type(s) string"
    );
    assert_eq!(app.store.find_one(ISBN).await.unwrap(), sample_book());
}

#[tokio::test]
async fn put_unknown_isbn_is_404() {
    let app = setup().await;

    let (status, body) = send(&app.router, Method::PUT, "/books/0691161", Some(new_book_payload())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(error_message(&body).starts_with("There is no book with an isbn '0691161'"));
}

#[tokio::test]
async fn delete_removes_book() {
    let app = setup().await;

    let (status, body) = send(&app.router, Method::DELETE, &format!("/books/{ISBN}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (status, _) = send(&app.router, Method::GET, &format!("/books/{ISBN}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_isbn_is_404() {
    let app = setup().await;

    let (status, _) = send(&app.router, Method::DELETE, "/books/0691161", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_404_envelope() {
    let app = setup().await;

    let (status, body) = send(&app.router, Method::GET, "/authors", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Not Found");
}

#[tokio::test]
async fn openapi_lists_book_paths() {
    let app = setup().await;

    let (status, body) = send(&app.router, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books/{isbn}"]["put"].is_object());
    assert!(body["components"]["schemas"]["Book"].is_object());
}
