//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What happens after a state behavior requests an internal event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadePolicy {
    /// Record the new current state and return to the caller. The new state's
    /// behavior runs on the next external event that enters it.
    #[default]
    RecordOnly,

    /// Run the new state's behavior immediately, repeating until a behavior
    /// requests no further internal event.
    Cascade,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid engine config: {0}")]
    Invalid(String),
}

/// Per-instance engine settings.
///
/// # Example
///
/// ```rust
/// use statemap::config::{CascadePolicy, EngineConfig};
///
/// let config = EngineConfig::from_json(r#"{ "cascade": "cascade", "max_internal_hops": 4 }"#)
///     .unwrap();
///
/// assert_eq!(config.cascade, CascadePolicy::Cascade);
/// assert_eq!(config.max_internal_hops, 4);
/// assert!(config.record_history);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cascade: CascadePolicy,

    /// Longest chain of internal events one external event may trigger
    /// under [`CascadePolicy::Cascade`].
    pub max_internal_hops: usize,

    pub record_history: bool,

    /// Oldest history entries are dropped beyond this; `None` keeps all.
    pub history_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cascade: CascadePolicy::RecordOnly,
            max_internal_hops: 16,
            record_history: true,
            history_limit: Some(256),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_internal_hops == 0 {
            return Err(ConfigError::Invalid(
                "max_internal_hops must be at least 1".to_string(),
            ));
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "history_limit must be at least 1, or null for unbounded".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cascade(mut self, policy: CascadePolicy) -> Self {
        self.cascade = policy;
        self
    }

    pub fn max_internal_hops(mut self, hops: usize) -> Self {
        self.max_internal_hops = hops;
        self
    }

    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    pub fn history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }
}
