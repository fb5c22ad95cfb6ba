//! Response schema and validation report types.
//!
//! Every backend response is checked against a `ResponseSchema` before it is
//! decoded. Only a passing `ValidationReport` lets the payload through.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::Endpoint;

/// The structural contract for one endpoint's response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// Unique identifier for this schema (e.g. "regions-v1").
    pub schema_id: String,
    /// The endpoint whose responses this schema describes.
    pub endpoint: Endpoint,
    /// A JSON Schema document used for structural validation.
    pub json_schema: Value,
}

/// The result of validating one response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only if the body satisfied the schema.
    pub passed: bool,
    /// Every violation found. Empty on pass.
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn pass() -> Self {
        Self {
            passed: true,
            failures: Vec::new(),
        }
    }

    /// All failure messages joined into one line, for error values and logs.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single violation within a `ValidationReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// JSON pointer to the offending value ("" for the document root).
    pub instance_path: String,
    /// Human-readable explanation.
    pub message: String,
}
