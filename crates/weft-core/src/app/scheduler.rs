//! ChainScheduler - チェーンの構築と投入
//!
//! # 投入の順序
//! 1. encode した定義を `chain_def_<id>` に保存
//! 2. id をキューの末尾に追加
//!
//! 定義なしでキューに載ることはありません。2 の前に落ちると
//! 定義だけが残る（orphan）ので、`orphaned_definitions` / `purge_orphans`
//! で検出・削除できます。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::codec::ChainCodec;
use crate::config::EngineConfig;
use crate::domain::{ChainDefinition, ChainId, Step, TaskSpec, WeftError};
use crate::ports::{DurableStore, IdGenerator};
use crate::queue::{PendingQueue, StoreKeys};

pub struct ChainScheduler {
    store: Arc<dyn DurableStore>,
    queue: PendingQueue,
    keys: StoreKeys,
    ids: Arc<dyn IdGenerator>,
    max_steps: Option<usize>,
}

impl ChainScheduler {
    pub fn new(
        store: Arc<dyn DurableStore>,
        ids: Arc<dyn IdGenerator>,
        config: &EngineConfig,
    ) -> Self {
        let keys = config.keys();
        let queue = PendingQueue::new(Arc::clone(&store), keys.queue_key());
        Self {
            store,
            queue,
            keys,
            ids,
            max_steps: config.max_steps_per_chain,
        }
    }

    /// Start a chain whose first step is a single task.
    pub fn begin_with(&self, task: TaskSpec) -> ChainBuilder<'_> {
        ChainBuilder {
            scheduler: self,
            id: self.ids.generate_chain_id(),
            steps: vec![Step::single(task)],
        }
    }

    /// Start a chain whose first step runs `tasks` concurrently.
    pub fn begin_with_all(
        &self,
        tasks: impl IntoIterator<Item = TaskSpec>,
    ) -> Result<ChainBuilder<'_>, WeftError> {
        let step = Step::parallel(tasks)?;
        Ok(ChainBuilder {
            scheduler: self,
            id: self.ids.generate_chain_id(),
            steps: vec![step],
        })
    }

    /// Persist `definition` and append it to the pending queue.
    pub async fn enqueue_definition(&self, definition: &ChainDefinition) -> Result<(), WeftError> {
        if let Some(max) = self.max_steps
            && definition.step_count() > max
        {
            return Err(WeftError::InvalidChain(format!(
                "chain {} has {} steps, more than the allowed {max}",
                definition.id(),
                definition.step_count()
            )));
        }

        let key = self.keys.definition_key(definition.id());
        if self.store.get(&key).await?.is_some() {
            return Err(WeftError::InvalidChain(format!(
                "chain {} is already pending",
                definition.id()
            )));
        }

        let bytes = ChainCodec::encode(definition)?;
        self.store.set(&key, bytes).await?;
        self.queue.enqueue(definition.id().clone()).await?;

        info!(
            chain_id = %definition.id(),
            steps = definition.step_count(),
            tasks = definition.task_count(),
            "chain enqueued"
        );
        Ok(())
    }

    pub async fn queue_size(&self) -> Result<usize, WeftError> {
        self.queue.size().await
    }

    pub async fn pending(&self) -> Result<Vec<ChainId>, WeftError> {
        self.queue.snapshot().await
    }

    /// Ids of every stored definition, in key order.
    pub async fn stored_definitions(&self) -> Result<Vec<ChainId>, WeftError> {
        let keys = self
            .store
            .list_with_prefix(&self.keys.definition_prefix())
            .await?;
        Ok(keys
            .iter()
            .filter_map(|key| self.keys.chain_id_from_key(key))
            .collect())
    }

    /// Stored definitions whose id is not queued.
    ///
    /// Must not run while `process_one` is executing: a chain that has just
    /// been dequeued still has its definition for a moment.
    pub async fn orphaned_definitions(&self) -> Result<Vec<ChainId>, WeftError> {
        let pending: HashSet<ChainId> = self.pending().await?.into_iter().collect();
        Ok(self
            .stored_definitions()
            .await?
            .into_iter()
            .filter(|id| !pending.contains(id))
            .collect())
    }

    /// Delete orphaned definitions; returns how many were removed.
    pub async fn purge_orphans(&self) -> Result<usize, WeftError> {
        let orphans = self.orphaned_definitions().await?;
        for id in &orphans {
            warn!(chain_id = %id, "deleting orphaned chain definition");
            self.store.delete(&self.keys.definition_key(id)).await?;
        }
        Ok(orphans.len())
    }
}

/// Accumulates steps for one chain; nothing is persisted until `enqueue`.
///
/// # 使用例
/// ```ignore
/// let mut chain = scheduler.begin_with(TaskSpec::new("fetch"));
/// chain.then_all([TaskSpec::new("resize"), TaskSpec::new("index")])?;
/// chain.then(TaskSpec::new("notify"));
/// let id = chain.enqueue().await?;
/// ```
pub struct ChainBuilder<'a> {
    scheduler: &'a ChainScheduler,
    id: ChainId,
    steps: Vec<Step>,
}

impl ChainBuilder<'_> {
    /// Use a caller-chosen id instead of a generated one.
    pub fn with_id(mut self, id: impl Into<ChainId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn then(&mut self, task: TaskSpec) -> &mut Self {
        self.steps.push(Step::single(task));
        self
    }

    /// Append a concurrent step. An empty set is rejected and the builder is
    /// left as it was.
    pub fn then_all(
        &mut self,
        tasks: impl IntoIterator<Item = TaskSpec>,
    ) -> Result<&mut Self, WeftError> {
        let step = Step::parallel(tasks)?;
        self.steps.push(step);
        Ok(self)
    }

    pub fn id(&self) -> &ChainId {
        &self.id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn build(&self) -> Result<ChainDefinition, WeftError> {
        ChainDefinition::new(self.id.clone(), self.steps.clone())
    }

    pub async fn enqueue(self) -> Result<ChainId, WeftError> {
        let definition = self.build()?;
        self.scheduler.enqueue_definition(&definition).await?;
        Ok(self.id)
    }
}
