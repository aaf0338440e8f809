//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! per_task_timeout_ms = 30000
//! cancel_grace_ms = 250
//! key_prefix = ""
//! max_steps_per_chain = 16
//! event_buffer = 64
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::WeftError;
use crate::queue::StoreKeys;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Timeout applied to each task unless its constraints override it.
    pub per_task_timeout_ms: u64,

    /// How long a timed-out task may take to honour the cancellation signal
    /// before it is dropped.
    pub cancel_grace_ms: u64,

    /// Namespace prepended to every store key.
    pub key_prefix: String,

    /// Optional guard on chain length, checked at enqueue and at load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps_per_chain: Option<usize>,

    /// Capacity of the broadcast buffer behind the default event sink.
    pub event_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            per_task_timeout_ms: 30_000,
            cancel_grace_ms: 250,
            key_prefix: String::new(),
            max_steps_per_chain: None,
            event_buffer: 64,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, WeftError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, WeftError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), WeftError> {
        if self.per_task_timeout_ms == 0 {
            return Err(WeftError::Config(
                "per_task_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(WeftError::Config(
                "event_buffer must be greater than zero".to_string(),
            ));
        }
        if self.max_steps_per_chain == Some(0) {
            return Err(WeftError::Config(
                "max_steps_per_chain must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_per_task_timeout(mut self, timeout: Duration) -> Self {
        self.per_task_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_max_steps_per_chain(mut self, max: usize) -> Self {
        self.max_steps_per_chain = Some(max);
        self
    }

    pub fn per_task_timeout(&self) -> Duration {
        Duration::from_millis(self.per_task_timeout_ms)
    }

    pub fn cancel_grace(&self) -> Duration {
        Duration::from_millis(self.cancel_grace_ms)
    }

    pub fn keys(&self) -> StoreKeys {
        StoreKeys::new(self.key_prefix.clone())
    }
}
