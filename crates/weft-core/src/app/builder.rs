//! EngineBuilder - エンジンの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - expect_kinds() で期待される task kind を登録
//! - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
//! - 不足があれば WeftError::MissingTaskKinds を返す
//!
//! # デフォルト
//! - ストア: InMemoryStore
//! - イベント: BroadcastEventSink（`Engine::subscribe` で購読）
//! - ID: UlidGenerator<SystemClock>

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use super::executor::ChainExecutor;
use super::scheduler::{ChainBuilder, ChainScheduler};
use super::status::EngineStatus;
use crate::config::EngineConfig;
use crate::domain::{ChainDefinition, ChainOutcome, CompletionEvent, TaskKind, TaskSpec, WeftError};
use crate::impls::{BroadcastEventSink, InMemoryStore};
use crate::ports::{DurableStore, EventSink, IdGenerator, SystemClock, UlidGenerator};
use crate::typed::{Handler, Payload, Task, TypedRegistry};

/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new()
///     .with_store(store)
///     .register::<Upload, _>(|| UploadHandler)?
///     .expect_kinds(&[Upload::KIND])
///     .build()?;
/// ```
pub struct EngineBuilder {
    registry: TypedRegistry,
    expected_kinds: Option<Vec<String>>,
    config: EngineConfig,
    store: Option<Arc<dyn DurableStore>>,
    sink: Option<Arc<dyn EventSink>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            registry: TypedRegistry::new(),
            expected_kinds: None,
            config: EngineConfig::default(),
            store: None,
            sink: None,
            ids: None,
        }
    }

    /// Handler を登録（`P::KIND` がキー）
    pub fn register<P, H>(
        mut self,
        factory: impl Fn() -> H + Send + Sync + 'static,
    ) -> Result<Self, WeftError>
    where
        P: Payload,
        H: Handler<P> + 'static,
    {
        self.registry.register::<P, H>(factory)?;
        Ok(self)
    }

    /// 生のバイト列を扱う Task を登録
    pub fn register_task(
        mut self,
        kind: impl Into<TaskKind>,
        factory: impl Fn() -> Arc<dyn Task> + Send + Sync + 'static,
    ) -> Result<Self, WeftError> {
        self.registry.register_task(kind, factory)?;
        Ok(self)
    }

    /// 期待される task kind のリストを設定
    pub fn expect_kinds(mut self, kinds: &[&str]) -> Self {
        self.expected_kinds = Some(kinds.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the default broadcast sink. `Engine::subscribe` then returns
    /// `None`.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<Engine, WeftError> {
        self.config.validate()?;

        if let Some(expected) = &self.expected_kinds {
            let missing: Vec<String> = expected
                .iter()
                .filter(|kind| !self.registry.contains(kind))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(WeftError::MissingTaskKinds(missing));
            }
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));
        let (sink, events) = match self.sink {
            Some(sink) => (sink, None),
            None => {
                let broadcast = BroadcastEventSink::new(self.config.event_buffer);
                (Arc::new(broadcast.clone()) as Arc<dyn EventSink>, Some(broadcast))
            }
        };

        let scheduler = ChainScheduler::new(Arc::clone(&store), ids, &self.config);
        let executor = ChainExecutor::new(store, Arc::new(self.registry), sink, self.config);

        Ok(Engine {
            scheduler,
            executor,
            events,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine はスケジューラ（投入側）とエグゼキュータ（実行側）をまとめたもの
pub struct Engine {
    scheduler: ChainScheduler,
    executor: ChainExecutor,
    events: Option<BroadcastEventSink>,
}

impl Engine {
    pub fn scheduler(&self) -> &ChainScheduler {
        &self.scheduler
    }

    pub fn executor(&self) -> &ChainExecutor {
        &self.executor
    }

    pub fn begin_with(&self, task: TaskSpec) -> ChainBuilder<'_> {
        self.scheduler.begin_with(task)
    }

    pub fn begin_with_all(
        &self,
        tasks: impl IntoIterator<Item = TaskSpec>,
    ) -> Result<ChainBuilder<'_>, WeftError> {
        self.scheduler.begin_with_all(tasks)
    }

    pub async fn enqueue(&self, definition: &ChainDefinition) -> Result<(), WeftError> {
        self.scheduler.enqueue_definition(definition).await
    }

    pub async fn queue_size(&self) -> Result<usize, WeftError> {
        self.scheduler.queue_size().await
    }

    /// See `ChainExecutor::process_one` for the single-caller precondition.
    pub async fn process_one(&self, budget: Duration) -> ChainOutcome {
        self.executor.process_one(budget).await
    }

    /// Subscribe to completion events of the default broadcast sink.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<CompletionEvent>> {
        self.events.as_ref().map(BroadcastEventSink::subscribe)
    }

    pub async fn status(&self) -> Result<EngineStatus, WeftError> {
        EngineStatus::collect(&self.scheduler).await
    }
}
