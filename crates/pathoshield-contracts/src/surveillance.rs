//! Surveillance dataset types.
//!
//! These mirror the three surveillance endpoints. Field names are
//! snake_case on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Directional change of a region's resistance rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One region's aggregated surveillance figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub region: String,
    pub lat: f64,
    pub lng: f64,
    pub cases: u64,
    /// Mean resistance rate as a fraction (0–1).
    pub avg_resistance_rate: f64,
    #[serde(default)]
    pub organisms: Vec<String>,
    pub trend: Trend,
}

/// One month of the resistance trend series.
///
/// Every field is optional because older backends only sent some of them;
/// the chart shaping code supplies the fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub month_index: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub resistance_rate: Option<f64>,
    #[serde(default)]
    pub cases: Option<u64>,
}

/// Case count for a single organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismShare {
    pub organism: String,
    #[serde(default)]
    pub cases: u64,
    #[serde(default)]
    pub percentage: Option<f64>,
}
