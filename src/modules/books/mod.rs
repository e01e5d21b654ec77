pub mod models;
pub mod routes;
pub mod schemas;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Migration, Module, RouteCtx};

pub use models::{Book, BookData};
pub use store::{BookStore, StoreError};

/// Book catalogue: CRUD over the `books` table
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        schemas::create_schema().map_err(|e| anyhow::anyhow!("{e}"))?;
        schemas::update_schema().map_err(|e| anyhow::anyhow!("{e}"))?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &RouteCtx<'_>) -> Router {
        routes::router(ctx)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = serde_json::json!({ "$ref": "#/components/schemas/Book" });
        let error_ref = serde_json::json!({ "$ref": "#/components/schemas/ErrorResponse" });
        let error_response = |description: &str| {
            serde_json::json!({
                "description": description,
                "content": { "application/json": { "schema": error_ref } }
            })
        };
        let isbn_param = serde_json::json!({
            "name": "isbn",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });

        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "books": { "type": "array", "items": book_ref }
                                            },
                                            "required": ["books"]
                                        }
                                    }
                                }
                            },
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": book_ref } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookResponse" }
                                    }
                                }
                            },
                            "400": error_response("Body failed schema validation"),
                            "500": error_response("Internal server error, e.g. duplicate isbn")
                        }
                    }
                },
                "/{isbn}": {
                    "get": {
                        "summary": "Get a book by isbn",
                        "tags": ["Books"],
                        "parameters": [isbn_param],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookResponse" }
                                    }
                                }
                            },
                            "404": error_response("No book with this isbn")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": [isbn_param],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": book_ref } }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookResponse" }
                                    }
                                }
                            },
                            "400": error_response("Body failed schema validation"),
                            "404": error_response("No book with this isbn")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [isbn_param],
                        "responses": {
                            "200": {
                                "description": "Deleted",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": { "message": { "type": "string" } },
                                            "required": ["message"]
                                        }
                                    }
                                }
                            },
                            "404": error_response("No book with this isbn")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "isbn": { "type": "string", "description": "Unique identifier for the book" },
                            "amazon_url": { "type": "string", "description": "Amazon listing" },
                            "author": { "type": "string" },
                            "language": { "type": "string" },
                            "pages": { "type": "integer" },
                            "publisher": { "type": "string" },
                            "title": { "type": "string" },
                            "year": { "type": "integer", "description": "Year of publication" }
                        },
                        "required": [
                            "isbn", "amazon_url", "author", "language",
                            "pages", "publisher", "title", "year"
                        ]
                    },
                    "BookResponse": {
                        "type": "object",
                        "properties": { "book": book_ref },
                        "required": ["book"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    isbn       TEXT PRIMARY KEY,
                    amazon_url TEXT    NOT NULL,
                    author     TEXT    NOT NULL,
                    language   TEXT    NOT NULL,
                    pages      INTEGER NOT NULL,
                    publisher  TEXT    NOT NULL,
                    title      TEXT    NOT NULL,
                    year       INTEGER NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
