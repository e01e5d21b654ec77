//! Request body schemas for the books endpoints.

use bookstore_http::{AppError, AppResult};
use bookstore_schema::{JsonType, Schema, SchemaError, ValidationError, Violation, ViolationKind};
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

const STRING_FIELDS: [&str; 6] = [
    "isbn",
    "amazon_url",
    "author",
    "language",
    "publisher",
    "title",
];
const INTEGER_FIELDS: [&str; 2] = ["pages", "year"];

/// Field order used for `required`, and therefore for missing-field messages.
const ALL_FIELDS: [&str; 8] = [
    "isbn",
    "amazon_url",
    "author",
    "language",
    "pages",
    "publisher",
    "title",
    "year",
];

static CREATE_SCHEMA: Lazy<Result<Schema, SchemaError>> =
    Lazy::new(|| Schema::compile(book_document()));

/// Updates carry the full representation too; the path isbn wins over the
/// body isbn.
static UPDATE_SCHEMA: Lazy<Result<Schema, SchemaError>> =
    Lazy::new(|| Schema::compile(book_document()));

pub fn create_schema() -> AppResult<&'static Schema> {
    compiled(&CREATE_SCHEMA)
}

pub fn update_schema() -> AppResult<&'static Schema> {
    compiled(&UPDATE_SCHEMA)
}

fn compiled(schema: &'static Lazy<Result<Schema, SchemaError>>) -> AppResult<&'static Schema> {
    schema
        .as_ref()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("books schema: {e}")))
}

fn book_document() -> Value {
    let mut properties = Map::new();
    for field in STRING_FIELDS {
        properties.insert(field.to_string(), json!({ "type": "string" }));
    }
    for field in INTEGER_FIELDS {
        properties.insert(field.to_string(), json!({ "type": "integer" }));
    }

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": properties,
        "required": ALL_FIELDS,
    })
}

/// Rewrite whole-number floats in the integer fields (`1000.0`) as integers.
/// Runs after schema validation; values outside the `i64` range are reported
/// as integer type violations.
pub fn normalize_integers(payload: &mut Value) -> Result<(), ValidationError> {
    let Some(object) = payload.as_object_mut() else {
        return Ok(());
    };

    let mut violations = Vec::new();
    for field in INTEGER_FIELDS {
        let Some(Value::Number(number)) = object.get(field) else {
            continue;
        };
        if number.is_i64() {
            continue;
        }

        match number.as_f64().filter(|f| fits_i64(*f)) {
            Some(whole) => {
                object.insert(field.to_string(), json!(whole as i64));
            }
            None => violations.push(Violation {
                path: vec![field.to_string()],
                kind: ViolationKind::WrongType {
                    expected: vec![JsonType::Integer],
                },
            }),
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations))
    }
}

/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn fits_i64(value: f64) -> bool {
    value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
}
