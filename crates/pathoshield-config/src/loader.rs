//! Loading and validating a `ConsoleConfig`.

use std::path::Path;

use tracing::{debug, info};

use pathoshield_contracts::error::{AmrError, AmrResult};

use crate::model::{ConsoleConfig, DataSourceKind};

fn config_error(reason: impl Into<String>) -> AmrError {
    AmrError::ConfigError {
        reason: reason.into(),
    }
}

impl ConsoleConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `AmrError::ConfigError` if the TOML is malformed, does not
    /// match the schema, or holds an invalid value.
    pub fn from_toml_str(s: &str) -> AmrResult<Self> {
        let config: ConsoleConfig =
            toml::from_str(s).map_err(|e| config_error(format!("failed to parse config TOML: {}", e)))?;
        config.validate()?;
        debug!(data_source = ?config.data_source, base_url = %config.api.base_url, "config parsed");
        Ok(config)
    }

    /// Read and parse the file at `path`.
    pub fn from_file(path: &Path) -> AmrResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load `path` when given, otherwise start from the defaults.
    pub fn load(path: Option<&Path>) -> AmrResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line or environment overrides, then re-validate.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        data_source: Option<DataSourceKind>,
    ) -> AmrResult<Self> {
        if let Some(url) = base_url {
            self.api.base_url = url;
        }
        if let Some(kind) = data_source {
            self.data_source = kind;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> AmrResult<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(config_error(format!(
                "api.base_url must start with http:// or https://, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.request_timeout_secs == 0 || self.api.connect_timeout_secs == 0 {
            return Err(config_error("api timeouts must be at least one second"));
        }
        if self.health.poll_interval_secs == 0 {
            return Err(config_error("health.poll_interval_secs must be at least 1"));
        }
        if self.upload.max_bytes == 0 {
            return Err(config_error("upload.max_bytes must be positive"));
        }
        if self.upload.limits().extensions.iter().all(|e| e.is_empty()) {
            return Err(config_error("upload.extensions must name at least one extension"));
        }
        if self.theme.chart_palette.is_empty() {
            return Err(config_error("theme.chart_palette must not be empty"));
        }
        self.theme.palette()?;
        Ok(())
    }

    /// `base_url` without a trailing slash, ready for joining paths.
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim().trim_end_matches('/')
    }
}
