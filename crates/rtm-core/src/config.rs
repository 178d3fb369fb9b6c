//! Session configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// RTM configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtmConfig {
    /// Drop redo history when a new (non-redo) commit is saved
    pub clear_redo_on_commit: bool,
    /// Maximum undo entries kept; oldest are dropped first
    pub history_limit: Option<usize>,
    /// Widen the delta view by one hop around changed entities
    pub delta_neighbor_context: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl RtmConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With redo clearing on new commits
    #[inline]
    #[must_use]
    pub fn with_clear_redo_on_commit(mut self, enabled: bool) -> Self {
        self.clear_redo_on_commit = enabled;
        self
    }

    /// With a bounded undo history
    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// With neighbor context in the delta view
    #[inline]
    #[must_use]
    pub fn with_delta_neighbor_context(mut self, enabled: bool) -> Self {
        self.delta_neighbor_context = enabled;
        self
    }

    /// With log filter directive
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML or out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns error if `history_limit` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RtmConfig {
    fn default() -> Self {
        Self {
            clear_redo_on_commit: false,
            history_limit: None,
            delta_neighbor_context: true,
            log_filter: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_keep_redo_history() {
        let config = RtmConfig::new();
        assert!(!config.clear_redo_on_commit);
        assert!(config.history_limit.is_none());
        assert!(config.delta_neighbor_context);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = RtmConfig::from_toml_str(
            r#"
            clear_redo_on_commit = true
            log_format = "json"
            "#,
        )
        .unwrap();
        assert!(config.clear_redo_on_commit);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn zero_history_limit_rejected() {
        let result = RtmConfig::from_toml_str("history_limit = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(
            RtmConfig::from_toml_str("history_limit = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "history_limit = 50\ndelta_neighbor_context = false").unwrap();

        let config = RtmConfig::load(file.path()).unwrap();
        assert_eq!(config.history_limit, Some(50));
        assert!(!config.delta_neighbor_context);
    }

    #[test]
    fn load_missing_file() {
        let result = RtmConfig::load("/nonexistent/rtm.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
