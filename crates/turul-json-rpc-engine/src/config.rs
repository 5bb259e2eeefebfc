//! Configuration types for the JSON-RPC engine

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Label recorded on every log event of this engine
    pub name: Option<String>,

    /// Identifier strategy, used when no generator is injected
    pub ids: IdConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// How outbound request identifiers are produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum IdConfig {
    /// Integers counting up from `start`
    Sequential {
        #[serde(default)]
        start: i64,
    },
    /// Strings `{prefix}{n}` counting up from `start`
    Prefixed {
        prefix: String,
        #[serde(default)]
        start: u64,
    },
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether to log full envelope text at trace level
    pub log_payloads: bool,

    /// Whether responses with an unknown id are logged at debug level
    pub log_unmatched_responses: bool,
}

impl Default for IdConfig {
    fn default() -> Self {
        IdConfig::Sequential { start: 0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_payloads: false,
            log_unmatched_responses: true,
        }
    }
}

impl EngineConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Load configuration from JSON text. Missing sections take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.name, None);
        assert_eq!(config.ids, IdConfig::Sequential { start: 0 });
        assert!(!config.logging.log_payloads);
        assert!(config.logging.log_unmatched_responses);
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(
            r#"{"name": "peer-a", "ids": {"strategy": "prefixed", "prefix": "req_"}}"#,
        )
        .unwrap();

        assert_eq!(config.name.as_deref(), Some("peer-a"));
        assert_eq!(
            config.ids,
            IdConfig::Prefixed {
                prefix: "req_".to_string(),
                start: 0
            }
        );
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = EngineConfig::from_json_str("{\"ids\": 3}").unwrap_err();
        assert!(matches!(err, EngineError::Serialization(_)));
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::named("roundtrip");
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }
}
