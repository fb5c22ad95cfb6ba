//! The backend endpoints the console talks to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Every backend call the console makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    Health,
    RunPrediction,
    CreatePrescription,
    Regions,
    Trends,
    Organisms,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Health,
        Endpoint::RunPrediction,
        Endpoint::CreatePrescription,
        Endpoint::Regions,
        Endpoint::Trends,
        Endpoint::Organisms,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Health => "/health",
            Endpoint::RunPrediction => "/api/prediction/run",
            Endpoint::CreatePrescription => "/api/eprescription",
            Endpoint::Regions => "/api/surveillance/regions",
            Endpoint::Trends => "/api/surveillance/trends",
            Endpoint::Organisms => "/api/surveillance/organisms",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::RunPrediction | Endpoint::CreatePrescription => Method::Post,
            _ => Method::Get,
        }
    }

    /// Key of the array inside a collection envelope, e.g. `{"regions": [...]}`.
    ///
    /// `None` for endpoints that return a single object.
    pub fn collection_key(self) -> Option<&'static str> {
        match self {
            Endpoint::Regions => Some("regions"),
            Endpoint::Trends => Some("trends"),
            Endpoint::Organisms => Some("distribution"),
            _ => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self.method() {
            Method::Get => "GET",
            Method::Post => "POST",
        };
        write!(f, "{} {}", method, self.path())
    }
}
