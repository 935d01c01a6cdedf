//! Configuration for the Analyzer

use pdflens_domain::PDF_MIME_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// File API upload limit (50 MiB) scaled by a 0.85 safety margin
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024 / 100 * 85;

/// Configuration for the Analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Partitions larger than this are split before upload (bytes)
    pub max_upload_bytes: usize,

    /// Status polls before an upload is declared stuck
    pub poll_attempts: u32,

    /// Delay between status polls (milliseconds)
    pub poll_interval_ms: u64,

    /// Wall-clock bound on fetching a document from a web address (seconds)
    pub fetch_timeout_secs: u64,

    /// MIME type sent with uploads and analysis calls
    pub mime_type: String,

    /// Try the whole document in one call before partitioning
    pub attempt_whole_document: bool,
}

impl AnalyzerConfig {
    /// Get the poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Get the fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }
        if self.poll_attempts == 0 {
            return Err("poll_attempts must be greater than 0".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }
        if self.mime_type.trim().is_empty() {
            return Err("mime_type must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            poll_attempts: 10,
            poll_interval_ms: 2_000,
            fetch_timeout_secs: 60,
            mime_type: PDF_MIME_TYPE.to_string(),
            attempt_whole_document: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_upload_bytes, 44_564_480);
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_poll_attempts() {
        let mut config = AnalyzerConfig::default();
        config.poll_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_upload_ceiling() {
        let mut config = AnalyzerConfig::default();
        config.max_upload_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_mime_type() {
        let mut config = AnalyzerConfig::default();
        config.mime_type = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalyzerConfig {
            poll_attempts: 3,
            attempt_whole_document: false,
            ..AnalyzerConfig::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = AnalyzerConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = AnalyzerConfig::from_toml("poll_interval_ms = 500\n").unwrap();
        assert_eq!(parsed.poll_interval_ms, 500);
        assert_eq!(parsed.poll_attempts, 10);
        assert!(parsed.attempt_whole_document);
    }

    #[test]
    fn test_bad_toml() {
        assert!(AnalyzerConfig::from_toml("poll_attempts = \"many\"").is_err());
    }
}
