//! Outcome model: per-task results and per-chain terminal outcomes.
//!
//! This module does not assume any particular runtime. It only defines the
//! "shape" of results the executor reports and observers can record.

use serde::{Deserialize, Serialize};

use super::ids::ChainId;
use super::task::TaskKind;

/// Why a task did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The registry had no task for the kind.
    UnknownKind,
    /// The task returned an error.
    Error,
    /// The task exceeded its own timeout.
    Timeout,
    /// The invocation budget ran out while the task was in flight.
    Cancelled,
    /// The task panicked.
    Panicked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub kind: TaskKind,
    pub success: bool,
    pub detail: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl TaskOutcome {
    pub fn success(kind: TaskKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            success: true,
            detail: detail.into(),
            failure: None,
        }
    }

    pub fn failure(kind: TaskKind, failure: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            success: false,
            detail: detail.into(),
            failure: Some(failure),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self.failure,
            Some(FailureKind::Timeout) | Some(FailureKind::Cancelled)
        )
    }
}

/// Terminal result of one `process_one` invocation.
///
/// `Abandoned` is never returned by the executor: it names the state a chain
/// is left in when the host dies after the definition was deleted and before
/// a terminal outcome was reached. Hosts that track in-flight ids themselves
/// can use it to report that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainOutcome {
    Succeeded {
        chain_id: ChainId,
    },
    Failed {
        chain_id: ChainId,
        step_index: usize,
        task: TaskOutcome,
    },
    Abandoned {
        chain_id: ChainId,
    },
    DefinitionMissing {
        chain_id: ChainId,
    },
    CorruptDefinition {
        chain_id: ChainId,
        reason: String,
    },
    /// The store errored before the chain could be loaded.
    StoreFailure {
        chain_id: Option<ChainId>,
        reason: String,
    },
    /// The pending queue was empty.
    NoOp,
}

impl ChainOutcome {
    pub fn chain_id(&self) -> Option<&ChainId> {
        match self {
            Self::Succeeded { chain_id }
            | Self::Failed { chain_id, .. }
            | Self::Abandoned { chain_id }
            | Self::DefinitionMissing { chain_id }
            | Self::CorruptDefinition { chain_id, .. } => Some(chain_id),
            Self::StoreFailure { chain_id, .. } => chain_id.as_ref(),
            Self::NoOp => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::Abandoned { .. } => "abandoned",
            Self::DefinitionMissing { .. } => "definition_missing",
            Self::CorruptDefinition { .. } => "corrupt_definition",
            Self::StoreFailure { .. } => "store_failure",
            Self::NoOp => "noop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kind_serializes_as_screaming_case() {
        let s = serde_json::to_string(&FailureKind::UnknownKind).unwrap();
        assert_eq!(s, "\"UNKNOWN_KIND\"");
    }

    #[test]
    fn chain_outcome_is_tagged() {
        let outcome = ChainOutcome::Failed {
            chain_id: ChainId::new("c1"),
            step_index: 1,
            task: TaskOutcome::failure(TaskKind::new("b"), FailureKind::Error, "boom"),
        };
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v["outcome"], "FAILED");
        assert_eq!(v["step_index"], 1);
        assert_eq!(v["task"]["failure"], "ERROR");
    }

    #[test]
    fn noop_has_no_chain_id() {
        assert!(ChainOutcome::NoOp.chain_id().is_none());
        assert_eq!(ChainOutcome::NoOp.label(), "noop");
    }

    #[test]
    fn timeouts_and_cancellations_count_as_timeouts() {
        let kind = TaskKind::new("t");
        assert!(TaskOutcome::failure(kind.clone(), FailureKind::Timeout, "").is_timeout());
        assert!(TaskOutcome::failure(kind.clone(), FailureKind::Cancelled, "").is_timeout());
        assert!(!TaskOutcome::failure(kind.clone(), FailureKind::Error, "").is_timeout());
        assert!(!TaskOutcome::success(kind, "ok").is_timeout());
    }
}
