//! Pending chain queue persisted through the durable store.
//!
//! The whole queue lives under one key as a JSON list of chain ids. Every
//! operation is a read-modify-write against the store with no lock held in
//! between, so two overlapping callers can both see the same front element.
//! Callers must serialize access (see `ChainExecutor::process_one`).

mod keys;

pub use keys::{DEFINITION_PREFIX, QUEUE_KEY, StoreKeys};

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::codec::CodecError;
use crate::domain::{ChainId, WeftError};
use crate::ports::DurableStore;

pub struct PendingQueue {
    store: Arc<dyn DurableStore>,
    key: String,
}

impl PendingQueue {
    pub fn new(store: Arc<dyn DurableStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Append `id` to the end of the queue.
    pub async fn enqueue(&self, id: ChainId) -> Result<(), WeftError> {
        let mut ids = self.load().await?;
        ids.push_back(id);
        self.save(&ids).await
    }

    /// Remove and return the front id. An empty queue is left untouched
    /// (no write is issued).
    pub async fn dequeue_next(&self) -> Result<Option<ChainId>, WeftError> {
        let mut ids = self.load().await?;
        let Some(id) = ids.pop_front() else {
            return Ok(None);
        };
        self.save(&ids).await?;
        debug!(chain_id = %id, remaining = ids.len(), "dequeued chain");
        Ok(Some(id))
    }

    pub async fn size(&self) -> Result<usize, WeftError> {
        Ok(self.load().await?.len())
    }

    /// All pending ids, front first.
    pub async fn snapshot(&self) -> Result<Vec<ChainId>, WeftError> {
        Ok(self.load().await?.into())
    }

    async fn load(&self) -> Result<VecDeque<ChainId>, WeftError> {
        match self.store.get(&self.key).await? {
            None => Ok(VecDeque::new()),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| WeftError::Codec(CodecError::Decode(e))),
        }
    }

    async fn save(&self, ids: &VecDeque<ChainId>) -> Result<(), WeftError> {
        let bytes = serde_json::to_vec(ids).map_err(|e| WeftError::Codec(CodecError::Encode(e)))?;
        self.store.set(&self.key, bytes).await?;
        Ok(())
    }
}
