//! TOML-based service configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::dispatch::SearchSettings;

/// Largest exhaustive-search fleet accepted; `2^25` subsets is already slow.
const MAX_EXHAUSTIVE_LIMIT: usize = 25;

/// Top-level service configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`ServiceConfig::from_toml_file`] or use [`ServiceConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Optimizer search settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Log filter settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port (must be > 0).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
        }
    }
}

/// Curtailment search settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Largest wind fleet searched exhaustively.
    pub exhaustive_limit: usize,
    /// Spacing (MW) the large-fleet search thins its reachable sums to.
    pub resolution_mw: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let settings = SearchSettings::default();
        Self {
            exhaustive_limit: settings.exhaustive_limit,
            resolution_mw: settings.resolution_mw,
        }
    }
}

impl From<&DispatchConfig> for SearchSettings {
    fn from(cfg: &DispatchConfig) -> Self {
        Self {
            exhaustive_limit: cfg.exhaustive_limit,
            resolution_mw: cfg.resolution_mw,
        }
    }
}

/// Log filter settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"server.port"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ServiceConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Search settings for the optimizer.
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings::from(&self.dispatch)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                field: "server.port".into(),
                message: "must be > 0".into(),
            });
        }
        if self.server.host.trim().is_empty() {
            errors.push(ConfigError {
                field: "server.host".into(),
                message: "must not be empty".into(),
            });
        }

        let d = &self.dispatch;
        if d.exhaustive_limit > MAX_EXHAUSTIVE_LIMIT {
            errors.push(ConfigError {
                field: "dispatch.exhaustive_limit".into(),
                message: format!("must be <= {MAX_EXHAUSTIVE_LIMIT}"),
            });
        }
        if !(d.resolution_mw.is_finite() && d.resolution_mw > 0.0) {
            errors.push(ConfigError {
                field: "dispatch.resolution_mw".into(),
                message: "must be > 0".into(),
            });
        }

        if self.logging.filter.trim().is_empty() {
            errors.push(ConfigError {
                field: "logging.filter".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let cfg = ServiceConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "defaults should be valid: {errors:?}");
        assert_eq!(cfg.server.port, 8888);
        assert_eq!(cfg.search_settings(), SearchSettings::default());
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[dispatch]
exhaustive_limit = 12
resolution_mw = 0.5

[logging]
filter = "merit_dispatch=debug"
"#;
        let cfg = ServiceConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.server.port), Some(9000));
        assert_eq!(cfg.as_ref().map(|c| c.dispatch.exhaustive_limit), Some(12));
        assert_eq!(
            cfg.as_ref().map(|c| c.search_settings().resolution_mw),
            Some(0.5)
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[dispatch]
exhaustive_limit = 10
bogus_field = true
"#;
        assert!(ServiceConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[server]
port = 3000
"#;
        let cfg = ServiceConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.server.port), Some(3000));
        assert_eq!(cfg.as_ref().map(|c| c.server.host.as_str()), Some("0.0.0.0"));
        assert_eq!(cfg.as_ref().map(|c| c.dispatch.exhaustive_limit), Some(20));
    }

    #[test]
    fn validation_catches_zero_port() {
        let mut cfg = ServiceConfig::default();
        cfg.server.port = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "server.port"));
    }

    #[test]
    fn validation_catches_bad_resolution() {
        let mut cfg = ServiceConfig::default();
        cfg.dispatch.resolution_mw = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "dispatch.resolution_mw"));
    }

    #[test]
    fn validation_caps_exhaustive_limit() {
        let mut cfg = ServiceConfig::default();
        cfg.dispatch.exhaustive_limit = 40;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "dispatch.exhaustive_limit"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ServiceConfig::from_toml_file(Path::new("/nonexistent/merit.toml"))
            .expect_err("missing file should fail");
        assert!(err.message.contains("/nonexistent/merit.toml"));
    }
}
