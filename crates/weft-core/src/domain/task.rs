use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::Constraints;

/// Opaque identifier of a task implementation (e.g. `acme.sync.upload.v1`).
///
/// The registry resolves a `TaskKind` to an executable task; the engine never
/// interprets the string itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKind(String);

impl TaskKind {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKind {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One unit of work inside a step: kind + opaque payload (+ constraints).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub kind: TaskKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

impl TaskSpec {
    pub fn new(kind: impl Into<TaskKind>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
            constraints: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Serialize `value` as JSON and use it as the payload.
    ///
    /// Typed handlers decode their payload as JSON, so this is the usual way
    /// to hand structured input to them.
    pub fn with_json_payload<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.with_payload(bytes))
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Per-task run limit, if the constraints override the engine default.
    pub fn max_run(&self) -> Option<Duration> {
        self.constraints.as_ref().and_then(Constraints::max_run)
    }
}
