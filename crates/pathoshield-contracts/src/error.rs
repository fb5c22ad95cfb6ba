//! Error types shared by every PathoShield crate.
//!
//! All fallible operations return `AmrResult<T>`. Variants map onto the
//! three failure classes the screens distinguish: validation failures that
//! block a submission, transport/HTTP failures shown as a page-level
//! message, and payloads the API boundary refused to accept.

use thiserror::Error;

/// The unified error type for the PathoShield console.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmrError {
    /// A required form field is missing or invalid. No request was sent.
    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    /// The request never produced an HTTP response (connection refused,
    /// timeout, DNS failure).
    #[error("network error: {reason}")]
    Network { reason: String },

    /// The backend answered with a non-success status.
    #[error("{detail}")]
    Http { status: u16, detail: String },

    /// The backend answered, but the body did not match the endpoint schema.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedPayload { endpoint: String, reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Reading a sample or writing a prescription file failed.
    #[error("i/o error: {reason}")]
    Io { reason: String },

    /// A workflow was asked to make a transition its current state forbids.
    #[error("state machine error: {reason}")]
    StateMachineError { reason: String },
}

impl AmrError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an illegal workflow transition.
    pub fn state(reason: impl Into<String>) -> Self {
        Self::StateMachineError {
            reason: reason.into(),
        }
    }

    /// True for errors raised before any request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Convenience alias used throughout the PathoShield crates.
pub type AmrResult<T> = Result<T, AmrError>;
