//! Backend health types.

use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: String,
    /// "connected", "disconnected" or "error: ..." on the reference backend.
    #[serde(default)]
    pub database: Option<String>,
}

/// What the header's connectivity indicator shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No health check has completed yet.
    #[default]
    Unknown,
    Online { message: String },
    Offline { reason: String },
}

impl ConnectionState {
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionState::Online { .. })
    }

    pub fn label(&self) -> &str {
        match self {
            ConnectionState::Unknown => "checking",
            ConnectionState::Online { .. } => "online",
            ConnectionState::Offline { .. } => "offline",
        }
    }
}
