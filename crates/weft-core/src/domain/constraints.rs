//! Execution constraints attached to a task.
//!
//! Device-level requirements (network, charging, idle, ...) are advisory: the
//! host decides when to invoke the engine and is expected to honour them. They
//! are persisted verbatim with the chain so the host can inspect them later.
//! `max_run_ms` is the only field the engine itself enforces.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Network requirement for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkType {
    #[default]
    NotRequired,
    Connected,
    Unmetered,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub network: NetworkType,
    pub requires_charging: bool,
    pub requires_battery_not_low: bool,
    pub requires_storage_not_low: bool,
    pub requires_device_idle: bool,

    /// Overrides the engine's per-task timeout for this task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_run_ms: Option<u64>,
}

impl Constraints {
    pub fn with_network(mut self, network: NetworkType) -> Self {
        self.network = network;
        self
    }

    pub fn requiring_charging(mut self) -> Self {
        self.requires_charging = true;
        self
    }

    pub fn requiring_battery_not_low(mut self) -> Self {
        self.requires_battery_not_low = true;
        self
    }

    pub fn requiring_storage_not_low(mut self) -> Self {
        self.requires_storage_not_low = true;
        self
    }

    pub fn requiring_device_idle(mut self) -> Self {
        self.requires_device_idle = true;
        self
    }

    pub fn with_max_run(mut self, limit: Duration) -> Self {
        self.max_run_ms = Some(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn max_run(&self) -> Option<Duration> {
        self.max_run_ms.map(Duration::from_millis)
    }

    /// True when the host has nothing to wait for before running the task.
    pub fn is_unconstrained(&self) -> bool {
        self.network == NetworkType::NotRequired
            && !self.requires_charging
            && !self.requires_battery_not_low
            && !self.requires_storage_not_low
            && !self.requires_device_idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let c: Constraints = serde_json::from_str("{}").unwrap();
        assert_eq!(c, Constraints::default());
        assert!(c.is_unconstrained());
    }

    #[test]
    fn network_type_uses_screaming_case() {
        let s = serde_json::to_string(&NetworkType::Unmetered).unwrap();
        assert_eq!(s, "\"UNMETERED\"");
    }

    #[test]
    fn device_requirements_mark_constrained() {
        let c = Constraints::default()
            .with_network(NetworkType::Connected)
            .requiring_charging();
        assert!(!c.is_unconstrained());
        assert!(c.requires_charging);
        assert_eq!(c.max_run(), None);
    }

    #[test]
    fn max_run_saturates_instead_of_truncating() {
        let c = Constraints::default().with_max_run(Duration::MAX);
        assert_eq!(c.max_run_ms, Some(u64::MAX));
        assert_eq!(c.max_run(), Some(Duration::from_millis(u64::MAX)));
    }
}
