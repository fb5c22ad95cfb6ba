//! # pathoshield-config
//!
//! TOML configuration for the PathoShield console: backend location and
//! timeouts, live or mock data, health polling, upload limits, output
//! directory and theme colours.
//!
//! ```rust,ignore
//! use pathoshield_config::ConsoleConfig;
//!
//! let config = ConsoleConfig::from_file(Path::new("pathoshield.toml"))?
//!     .with_overrides(env_url, None)?;
//! ```

pub mod loader;
pub mod model;

pub use model::{ConsoleConfig, DataSourceKind, Palette, Rgb};

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use pathoshield_contracts::error::AmrError;

    use super::*;

    fn assert_config_error(result: Result<ConsoleConfig, AmrError>, needle: &str) {
        match result {
            Err(AmrError::ConfigError { reason }) => {
                assert!(reason.contains(needle), "reason {reason:?} should mention {needle:?}")
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_document_is_all_defaults() {
        let config = ConsoleConfig::from_toml_str("").unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.data_source, DataSourceKind::Live);
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = ConsoleConfig::from_toml_str(
            r#"
            data_source = "mock"

            [api]
            base_url = "https://amr.example.org/"

            [health]
            poll_interval_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.data_source, DataSourceKind::Mock);
        assert_eq!(config.base_url(), "https://amr.example.org");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.health.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_upload_extensions_are_normalised() {
        let config = ConsoleConfig::from_toml_str(
            r#"
            [upload]
            max_bytes = 2048
            extensions = [".TXT", "fasta"]
            "#,
        )
        .unwrap();

        let limits = config.upload.limits();
        assert_eq!(limits.max_bytes, 2048);
        assert_eq!(limits.extensions, vec!["txt", "fasta"]);
    }

    #[test]
    fn test_unknown_data_source_is_rejected() {
        assert_config_error(
            ConsoleConfig::from_toml_str(r#"data_source = "cloud""#),
            "failed to parse config TOML",
        );
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert_config_error(
            ConsoleConfig::from_toml_str("[api]\nbase_url = \"localhost:8000\""),
            "api.base_url",
        );
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        assert_config_error(
            ConsoleConfig::from_toml_str("[health]\npoll_interval_secs = 0"),
            "poll_interval_secs",
        );
    }

    #[test]
    fn test_bad_theme_colour_is_rejected() {
        assert_config_error(
            ConsoleConfig::from_toml_str("[theme]\nalert = \"red\""),
            "invalid colour 'red'",
        );
    }

    #[test]
    fn test_palette_cycles() {
        let palette = ConsoleConfig::default().theme.palette().unwrap();
        assert_eq!(palette.alert, Rgb(0xdc, 0x26, 0x26));
        assert_eq!(palette.chart_color(0), palette.chart_color(palette.chart.len()));
    }

    #[test]
    fn test_overrides_apply_and_revalidate() {
        let config = ConsoleConfig::default()
            .with_overrides(Some("http://10.0.0.2:9000".to_string()), Some(DataSourceKind::Mock))
            .unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.data_source, DataSourceKind::Mock);

        assert_config_error(
            ConsoleConfig::default().with_overrides(Some("ftp://nope".to_string()), None),
            "api.base_url",
        );
    }

    #[test]
    fn test_data_source_from_str() {
        assert_eq!(" Mock ".parse::<DataSourceKind>().unwrap(), DataSourceKind::Mock);
        assert!("remote".parse::<DataSourceKind>().is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        assert_config_error(
            ConsoleConfig::from_file(Path::new("/nonexistent/pathoshield.toml")),
            "failed to read config file",
        );
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(ConsoleConfig::load(None).unwrap(), ConsoleConfig::default());
    }
}
