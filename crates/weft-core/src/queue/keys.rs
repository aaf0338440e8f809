//! Store key layout.

use crate::domain::ChainId;

pub const QUEUE_KEY: &str = "chain_queue";
pub const DEFINITION_PREFIX: &str = "chain_def_";

/// Keys used in the durable store, optionally namespaced by a prefix so
/// several engines can share one store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreKeys {
    prefix: String,
}

impl StoreKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn queue_key(&self) -> String {
        format!("{}{QUEUE_KEY}", self.prefix)
    }

    pub fn definition_prefix(&self) -> String {
        format!("{}{DEFINITION_PREFIX}", self.prefix)
    }

    pub fn definition_key(&self, id: &ChainId) -> String {
        format!("{}{DEFINITION_PREFIX}{id}", self.prefix)
    }

    /// Inverse of `definition_key`.
    pub fn chain_id_from_key(&self, key: &str) -> Option<ChainId> {
        key.strip_prefix(&self.definition_prefix())
            .filter(|id| !id.is_empty())
            .map(ChainId::new)
    }
}
