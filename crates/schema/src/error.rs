use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

use crate::types::JsonType;

/// A schema document could not be compiled.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema document: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    MissingProperty { property: String },
    WrongType { expected: Vec<JsonType> },
    /// Any other keyword; carries the validator's own message.
    Other { message: String },
}

/// One failed constraint, located by the property path of the offending
/// instance (empty for the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: Vec<String>,
    pub kind: ViolationKind,
}

impl Violation {
    /// Dotted name of the field the violation is about. For a missing
    /// property this is the property itself.
    pub fn field(&self) -> String {
        let mut segments = self.path.clone();
        if let ViolationKind::MissingProperty { property } = &self.kind {
            segments.push(property.clone());
        }
        segments.join(".")
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ViolationKind::MissingProperty { .. } => "required",
            ViolationKind::WrongType { .. } => "type",
            ViolationKind::Other { .. } => "invalid",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "field": self.field(),
            "error": self.code(),
            "message": self.to_string(),
        })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_path(f, &self.path)?;
        match &self.kind {
            ViolationKind::MissingProperty { property } => {
                write!(f, " requires property \"{property}\"")
            }
            ViolationKind::WrongType { expected } => {
                let names: Vec<&str> = expected.iter().map(|kind| kind.as_str()).collect();
                write!(f, " is not of a type(s) {}", names.join(","))
            }
            ViolationKind::Other { message } => write!(f, ": {message}"),
        }
    }
}

fn write_path(f: &mut fmt::Formatter<'_>, path: &[String]) -> fmt::Result {
    f.write_str("instance")?;
    for segment in path {
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            write!(f, "[{segment}]")?;
        } else if is_identifier(segment) {
            write!(f, ".{segment}")?;
        } else {
            write!(f, "[{}]", Value::String(segment.clone()))?;
        }
    }
    Ok(())
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// A payload failed validation. Holds every violation found; displays as one
/// message per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
