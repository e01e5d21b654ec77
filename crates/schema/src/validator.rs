//! Compiled JSON Schema documents, backed by the `jsonschema` crate.

use std::fmt;

use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde_json::Value;

use crate::error::{SchemaError, ValidationError, Violation, ViolationKind};
use crate::types::JsonType;

/// A schema document compiled once and reused for every payload.
pub struct Schema {
    document: Value,
    validator: jsonschema::Validator,
}

impl Schema {
    /// Compile a schema document. The draft is taken from `$schema` when
    /// present.
    pub fn compile(document: Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(&document).map_err(|e| SchemaError::Invalid {
                message: e.to_string(),
            })?;
        Ok(Self {
            document,
            validator,
        })
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Every violation of the schema by `instance`.
    ///
    /// Sorted by instance path, then type failures before missing
    /// properties; missing properties keep `required` order.
    pub fn violations(&self, instance: &Value) -> Vec<Violation> {
        let mut found: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(to_violation)
            .collect();
        found.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| rank(&a.kind).cmp(&rank(&b.kind)))
        });
        found
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

/// Validate `instance` against `schema`, reporting every violation at once.
pub fn validate(instance: &Value, schema: &Schema) -> Result<(), ValidationError> {
    let found = schema.violations(instance);
    if found.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(found))
    }
}

fn to_violation(error: jsonschema::ValidationError<'_>) -> Violation {
    let message = error.to_string();
    let path = pointer_segments(&error.instance_path.to_string());

    let kind = match error.kind {
        ValidationErrorKind::Required { property } => ViolationKind::MissingProperty {
            property: match property {
                Value::String(name) => name,
                other => other.to_string(),
            },
        },
        ValidationErrorKind::Type { kind } => ViolationKind::WrongType {
            expected: expected_types(kind),
        },
        _ => ViolationKind::Other { message },
    };

    Violation { path, kind }
}

fn expected_types(kind: TypeKind) -> Vec<JsonType> {
    let names: Vec<String> = match kind {
        TypeKind::Single(primitive) => vec![primitive.to_string()],
        TypeKind::Multiple(primitives) => primitives
            .into_iter()
            .map(|primitive| primitive.to_string())
            .collect(),
    };
    names.iter().filter_map(|name| name.parse().ok()).collect()
}

/// Split a JSON pointer (`/publisher/city`) into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn rank(kind: &ViolationKind) -> u8 {
    match kind {
        ViolationKind::WrongType { .. } => 0,
        ViolationKind::MissingProperty { .. } => 1,
        ViolationKind::Other { .. } => 2,
    }
}
