//! Configuration schema.
//!
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ```toml
//! data_source = "live"
//!
//! [api]
//! base_url = "http://localhost:8000"
//! request_timeout_secs = 30
//!
//! [health]
//! poll_interval_secs = 30
//!
//! [theme]
//! alert = "#dc2626"
//! chart_palette = ["#dc2626", "#3b82f6"]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pathoshield_contracts::error::{AmrError, AmrResult};
use pathoshield_core::prediction::UploadLimits;

/// Where the console gets its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSourceKind {
    /// The HTTP backend at `api.base_url`.
    #[default]
    Live,
    /// Built-in simulated responses. No network access.
    Mock,
}

impl std::str::FromStr for DataSourceKind {
    type Err = AmrError;

    fn from_str(s: &str) -> AmrResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(DataSourceKind::Live),
            "mock" => Ok(DataSourceKind::Mock),
            other => Err(AmrError::ConfigError {
                reason: format!("unknown data source '{other}' (expected 'live' or 'mock')"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub poll_interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}

impl HealthConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: u64,
    /// Accepted extensions. A leading dot and case are ignored.
    pub extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let limits = UploadLimits::default();
        Self {
            max_bytes: limits.max_bytes,
            extensions: limits.extensions,
        }
    }
}

impl UploadConfig {
    pub fn limits(&self) -> UploadLimits {
        UploadLimits {
            max_bytes: self.max_bytes,
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that saved prescription summaries are written to.
    pub prescription_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prescription_dir: PathBuf::from("prescriptions"),
        }
    }
}

/// A 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` (the `#` is optional).
    pub fn parse(hex: &str) -> AmrResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let bad = || AmrError::ConfigError {
            reason: format!("invalid colour '{hex}' (expected #rrggbb)"),
        };
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| bad());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Colours of the console. Passed explicitly from the binary's entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub primary: String,
    pub secondary: String,
    /// Increasing trends and resistant antibiotics.
    pub alert: String,
    /// Decreasing trends and online status.
    pub improving: String,
    pub neutral: String,
    pub chart_palette: Vec<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary: "#005cb3".to_string(),
            secondary: "#009255".to_string(),
            alert: "#dc2626".to_string(),
            improving: "#10b981".to_string(),
            neutral: "#6b7280".to_string(),
            chart_palette: [
                "#dc2626", "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4",
                "#f97316", "#84cc16", "#6366f1",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

/// Parsed theme colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub alert: Rgb,
    pub improving: Rgb,
    pub neutral: Rgb,
    pub chart: Vec<Rgb>,
}

impl Palette {
    /// Chart colour for `index`, cycling through the palette.
    pub fn chart_color(&self, index: usize) -> Rgb {
        if self.chart.is_empty() {
            return self.primary;
        }
        self.chart[index % self.chart.len()]
    }
}

impl ThemeConfig {
    pub fn palette(&self) -> AmrResult<Palette> {
        Ok(Palette {
            primary: Rgb::parse(&self.primary)?,
            secondary: Rgb::parse(&self.secondary)?,
            alert: Rgb::parse(&self.alert)?,
            improving: Rgb::parse(&self.improving)?,
            neutral: Rgb::parse(&self.neutral)?,
            chart: self
                .chart_palette
                .iter()
                .map(|c| Rgb::parse(c))
                .collect::<AmrResult<Vec<_>>>()?,
        })
    }
}

/// The complete console configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub data_source: DataSourceKind,
    pub api: ApiConfig,
    pub health: HealthConfig,
    pub upload: UploadConfig,
    pub output: OutputConfig,
    pub theme: ThemeConfig,
}
