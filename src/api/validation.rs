//! Request body validation.
//!
//! Request types derive `JsonSchema`; the generated schema is compiled once
//! at startup and every body is checked against it before deserialization,
//! so clients get every violation in one 400 response.

use std::fmt;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{Error, Result};

/// Compiled JSON schema for one request type.
pub struct SchemaValidator {
    schema: Value,
    validator: jsonschema::Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("title", &self.schema.get("title"))
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Generate and compile the schema of `T`.
    pub fn for_type<T: JsonSchema>() -> Result<Self> {
        let schema = serde_json::to_value(schemars::schema_for!(T))?;
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| Error::internal(format!("invalid request schema: {e}")))?;
        Ok(Self { schema, validator })
    }

    /// The generated schema document.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check `instance`, collecting every violation.
    pub fn check(&self, instance: &Value) -> Result<()> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(errors.join("; ")))
        }
    }

    /// Check `instance` then deserialize it.
    pub fn parse<T: DeserializeOwned>(&self, instance: Value) -> Result<T> {
        self.check(&instance)?;
        serde_json::from_value(instance).map_err(|e| Error::validation(e.to_string()))
    }
}

/// Validate that a string has visible content.
pub fn validate_non_blank(s: &str, field: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}
