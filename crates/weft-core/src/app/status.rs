//! Status - ストアの状態を説明するスナップショット

use serde::{Deserialize, Serialize};

use super::scheduler::ChainScheduler;
use crate::domain::{ChainId, WeftError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Queued ids, front first.
    pub pending: Vec<ChainId>,
    pub stored_definitions: usize,
    /// Definitions without a queue entry.
    pub orphaned: Vec<ChainId>,
}

impl EngineStatus {
    pub async fn collect(scheduler: &ChainScheduler) -> Result<Self, WeftError> {
        Ok(Self {
            pending: scheduler.pending().await?,
            stored_definitions: scheduler.stored_definitions().await?.len(),
            orphaned: scheduler.orphaned_definitions().await?,
        })
    }
}
