//! JSON Schema validation of request payloads.
//!
//! Schema documents are compiled with the `jsonschema` crate. Its errors are
//! mapped onto structured [`Violation`] values, every violation of a payload
//! is reported in a single pass, and turning them into text is left to the
//! caller (see the `Display` impls).

pub mod error;
pub mod types;
pub mod validator;

pub use error::{SchemaError, ValidationError, Violation, ViolationKind};
pub use types::JsonType;
pub use validator::{validate, Schema};
