#![forbid(unsafe_code)]

//! Editor configuration.
//!
//! [`EditorConfig`] groups the tunables of a session: the compile quiet
//! window, the environment active on load, and the reconnect policy. With the
//! `config` feature it loads from TOML or JSON; missing keys keep their
//! defaults.
//!
//! ```toml
//! # typlive.toml
//! compile_delay_ms = 250
//! initial_environment = "passage"
//!
//! [reconnect]
//! max_retries = 3
//!
//! [reconnect.backoff]
//! kind = "linear"
//! base_ms = 500
//! max_ms = 2000
//! ```
//!
//! ```rust,ignore
//! let config = EditorConfig::from_toml_file("typlive.toml")?.validated()?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

use typlive_core::Environment;
use web_time::Duration;

use crate::pipeline::DEFAULT_COMPILE_DELAY;
use crate::retry::RetryPolicy;

/// Upper bound accepted for the compile quiet window.
pub const MAX_COMPILE_DELAY_MS: u64 = 10_000;

/// Session tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct EditorConfig {
    /// Quiet window between the last edit and the compile request.
    pub compile_delay_ms: u64,
    /// Environment active when the page loads.
    pub initial_environment: Environment,
    /// Reconnect attempts and backoff after a dropped link.
    pub reconnect: RetryPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            compile_delay_ms: DEFAULT_COMPILE_DELAY.as_millis() as u64,
            initial_environment: Environment::default(),
            reconnect: RetryPolicy::default(),
        }
    }
}

impl EditorConfig {
    /// Compile quiet window as a duration.
    #[must_use]
    pub fn compile_delay(&self) -> Duration {
        Duration::from_millis(self.compile_delay_ms)
    }

    /// Set the compile quiet window.
    #[must_use]
    pub fn with_compile_delay(mut self, delay: Duration) -> Self {
        self.compile_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the environment active on load.
    #[must_use]
    pub fn with_initial_environment(mut self, env: Environment) -> Self {
        self.initial_environment = env;
        self
    }

    /// Set the reconnect policy.
    #[must_use]
    pub fn with_reconnect(mut self, policy: RetryPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.compile_delay_ms > MAX_COMPILE_DELAY_MS {
            errors.push(format!(
                "compile_delay_ms must be <= {MAX_COMPILE_DELAY_MS}, got {}",
                self.compile_delay_ms
            ));
        }
        errors.extend(self.reconnect.problems("reconnect"));
        errors
    }

    /// `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading an editor configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::BackoffStrategy;

    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_runtime_constants() {
        let config = EditorConfig::default();
        assert_eq!(config.compile_delay(), Duration::from_millis(300));
        assert_eq!(config.initial_environment, Environment::InterlineFormula);
        assert_eq!(config.reconnect, RetryPolicy::default());
    }

    #[test]
    fn default_validates_clean() {
        assert!(EditorConfig::default().validate().is_empty());
    }

    #[test]
    fn builders_override_fields() {
        let config = EditorConfig::default()
            .with_compile_delay(Duration::from_millis(120))
            .with_initial_environment(Environment::Passage)
            .with_reconnect(RetryPolicy::no_retry());
        assert_eq!(config.compile_delay_ms, 120);
        assert_eq!(config.initial_environment, Environment::Passage);
        assert_eq!(config.reconnect.max_retries, 0);
    }

    #[test]
    fn multiple_validation_errors_collected() {
        let config = EditorConfig::default()
            .with_compile_delay(Duration::from_secs(60))
            .with_reconnect(RetryPolicy::new(
                3,
                BackoffStrategy::Exponential {
                    base_ms: 0,
                    max_ms: 0,
                },
            ));
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("compile_delay_ms"));

        let err = config.validated().unwrap_err();
        assert!(err.to_string().starts_with("validation errors: "));
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_toml_preserves_defaults() {
        let config = EditorConfig::from_toml_str("initial_environment = \"inline-formula\"\n")
            .unwrap();
        assert_eq!(config.initial_environment, Environment::InlineFormula);
        assert_eq!(config.compile_delay_ms, 300);
        assert_eq!(config.reconnect, RetryPolicy::default());
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_backoff_uses_kind_tag() {
        let config = EditorConfig::from_toml_str(
            r#"
compile_delay_ms = 250

[reconnect]
max_retries = 3

[reconnect.backoff]
kind = "linear"
base_ms = 500
max_ms = 2000
"#,
        )
        .unwrap();
        assert_eq!(config.compile_delay_ms, 250);
        assert_eq!(
            config.reconnect,
            RetryPolicy::new(
                3,
                BackoffStrategy::Linear {
                    base_ms: 500,
                    max_ms: 2000,
                }
            )
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_loads_and_rejects_unknown_environment() {
        let config = EditorConfig::from_json_str(r#"{"compile_delay_ms": 0}"#).unwrap();
        assert_eq!(config.compile_delay(), Duration::ZERO);

        let err = EditorConfig::from_json_str(r#"{"initial_environment": "display"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_file_round_trip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "compile_delay_ms = 150").unwrap();
        let config = EditorConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.compile_delay_ms, 150);

        let missing = EditorConfig::from_toml_file(file.path().with_extension("absent"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
