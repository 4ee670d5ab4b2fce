use crate::error::ConfigError;
use crate::wiring::SuggestionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Milliseconds between ticks of a run when nothing else is configured.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 700;

/// Tunables of an editing session.
///
/// Every field has a default, so a partial JSON file such as
/// `{"tickIntervalMs": 250}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub tick_interval_ms: u64,
    pub suggestions: SuggestionOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            suggestions: SuggestionOptions::default(),
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"suggestions": {"strictTypes": true}}"#).unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(700));
        assert!(config.suggestions.normalize);
        assert!(config.suggestions.strict_types);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = EngineConfig::from_json(r#"{"tickIntervalMs": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTickInterval));
    }
}
