//! Schema-based response validator for the PathoShield API boundary.
//!
//! `ResponseValidator` compiles one JSON Schema per endpoint up front and
//! checks every response body against it before decoding. It fails closed:
//!
//! - **Collections** (regions, trends, organism distribution) lose the rows
//!   that violate their schema or do not decode. A broken envelope becomes an
//!   empty list, and the screens render their "no data" placeholder.
//! - **Single objects** (health, prediction result, prescription) that
//!   violate their schema become `AmrError::MalformedPayload`, which the
//!   workflow surfaces as a page-level message.

use std::collections::{HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use pathoshield_contracts::{
    endpoint::Endpoint,
    error::{AmrError, AmrResult},
    schema::{ValidationFailure, ValidationReport},
};

use crate::schemas::schema_for;

/// Validates and decodes backend response bodies.
pub struct ResponseValidator {
    validators: HashMap<Endpoint, jsonschema::Validator>,
}

impl ResponseValidator {
    /// Compile the schema of every endpoint.
    ///
    /// Returns `AmrError::ConfigError` if a schema document does not compile.
    pub fn new() -> AmrResult<Self> {
        let mut validators = HashMap::new();
        for endpoint in Endpoint::ALL {
            let schema = schema_for(endpoint);
            let validator =
                jsonschema::validator_for(&schema.json_schema).map_err(|e| AmrError::ConfigError {
                    reason: format!("invalid response schema '{}': {}", schema.schema_id, e),
                })?;
            validators.insert(endpoint, validator);
        }
        Ok(Self { validators })
    }

    /// Check `body` against `endpoint`'s schema, collecting every violation.
    pub fn validate(&self, endpoint: Endpoint, body: &Value) -> ValidationReport {
        let Some(validator) = self.validators.get(&endpoint) else {
            return ValidationReport::pass();
        };

        let failures: Vec<ValidationFailure> = validator
            .iter_errors(body)
            .map(|error| ValidationFailure {
                instance_path: error.instance_path.to_string(),
                message: format!("at '{}': {}", error.instance_path, error),
            })
            .collect();

        ValidationReport {
            passed: failures.is_empty(),
            failures,
        }
    }

    /// Validate and decode a single-object response.
    pub fn decode_object<T: DeserializeOwned>(&self, endpoint: Endpoint, body: Value) -> AmrResult<T> {
        let report = self.validate(endpoint, &body);
        if !report.passed {
            warn!(%endpoint, failures = report.failures.len(), "response rejected by schema");
            return Err(AmrError::MalformedPayload {
                endpoint: endpoint.to_string(),
                reason: report.summary(),
            });
        }

        serde_json::from_value(body).map_err(|e| AmrError::MalformedPayload {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    /// Validate and decode a collection envelope such as `{"regions": [...]}`.
    ///
    /// Never fails. Rows that violate the schema or do not decode are logged
    /// and dropped; the rest are kept. A body that is not an object, or whose
    /// collection is not an array, gives an empty list. So does an absent array.
    pub fn decode_collection<T: DeserializeOwned>(&self, endpoint: Endpoint, body: Value) -> Vec<T> {
        let Some(key) = endpoint.collection_key() else {
            warn!(%endpoint, "decode_collection called for a single-object endpoint");
            return Vec::new();
        };

        let report = self.validate(endpoint, &body);
        let mut rejected = HashSet::new();
        for failure in &report.failures {
            match row_index(&failure.instance_path, key) {
                Some(index) => {
                    if rejected.insert(index) {
                        warn!(%endpoint, index, reason = %failure.message, "dropping row that failed schema validation");
                    }
                }
                None => {
                    warn!(
                        %endpoint,
                        reason = %report.summary(),
                        "collection envelope failed schema validation; using empty list"
                    );
                    return Vec::new();
                }
            }
        }

        let rows = match body {
            Value::Object(mut map) => map.remove(key).unwrap_or(Value::Null),
            _ => Value::Null,
        };
        let rows = match rows {
            Value::Array(rows) => rows,
            _ => {
                debug!(%endpoint, key, "collection key absent; using empty list");
                return Vec::new();
            }
        };

        rows.into_iter()
            .enumerate()
            .filter(|(index, _)| !rejected.contains(index))
            .filter_map(|(index, row)| match serde_json::from_value::<T>(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(%endpoint, index, error = %e, "dropping row that failed to decode");
                    None
                }
            })
            .collect()
    }
}

/// Row number of a failure located inside the `key` array, e.g. `/regions/3/cases` → 3.
fn row_index(instance_path: &str, key: &str) -> Option<usize> {
    let rest = instance_path.strip_prefix('/')?.strip_prefix(key)?.strip_prefix('/')?;
    rest.split('/').next()?.parse().ok()
}
