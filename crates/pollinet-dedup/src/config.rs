//! Configuration for a deduplication run
//!
//! Loaded from TOML or JSON; every field has a default so partial files are
//! accepted.

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::error::ConfigError;

/// Run-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Seed for random tie-breaks; a fixed default is used when absent
    pub seed: Option<u64>,
    /// Duplicate classifier settings
    pub classifier: ClassifierConfig,
}

impl DedupConfig {
    /// Seed used when none is configured
    pub const DEFAULT_SEED: u64 = 0;

    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classifier.validate()
    }

    pub fn seed_or_default(&self) -> u64 {
        self.seed.unwrap_or(Self::DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DedupConfig::default();
        assert_eq!(config.classifier.threshold_fraction, 0.05);
        assert!(!config.classifier.compare.compare_values);
        assert!(!config.classifier.compare.count_unmapped_as_missing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = DedupConfig::from_toml(
            r#"
            seed = 17

            [classifier]
            threshold_fraction = 0.1

            [classifier.compare]
            compare_values = true
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.classifier.threshold_fraction, 0.1);
        assert!(config.classifier.compare.compare_values);
        assert!(!config.classifier.compare.count_unmapped_as_missing);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = DedupConfig::new();
        config.seed = Some(3);
        let text = config.to_toml().unwrap();
        assert_eq!(DedupConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_threshold() {
        let err = DedupConfig::from_json(r#"{"classifier": {"threshold_fraction": -1.0}}"#);
        assert!(matches!(err, Err(ConfigError::OutOfRange(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            DedupConfig::from_toml("classifier = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
