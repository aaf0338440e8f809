//! ChainExecutor - 1 回の呼び出しで 1 チェーンを処理する
//!
//! # フロー
//! 1. PendingQueue::dequeue_next() で chain id 取得（空なら NoOp）
//! 2. DurableStore から定義を読み込み decode（無い・壊れている → 破棄して終了）
//! 3. 定義を削除してから実行開始（at-most-once）
//! 4. ステップを順に実行。ステップ内のタスクは並行に走らせ、全部の終了を待つ
//! 5. 失敗したステップがあればそこで打ち切り Failed、全部成功なら Succeeded
//!
//! # 前提条件: 単一呼び出し
//! `process_one` を同じストアに対して同時に 2 つ以上走らせてはいけません。
//! キュー操作は読み取り→書き込みの非原子的な操作なので、重なった呼び出しは
//! 同じ id を取り出し得ます（重複実行・取りこぼしの原因）。
//! 呼び出し側（ホスト）が直列化を保証します。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::task_runner::{TaskRun, deadline_after, run_task};
use crate::codec::ChainCodec;
use crate::config::EngineConfig;
use crate::domain::{
    ChainDefinition, ChainId, ChainOutcome, CompletionEvent, FailureKind, Step, TaskOutcome,
};
use crate::ports::{DurableStore, EventSink, TaskRegistry};
use crate::queue::{PendingQueue, StoreKeys};

pub struct ChainExecutor {
    store: Arc<dyn DurableStore>,
    queue: PendingQueue,
    keys: StoreKeys,
    registry: Arc<dyn TaskRegistry>,
    sink: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl ChainExecutor {
    pub fn new(
        store: Arc<dyn DurableStore>,
        registry: Arc<dyn TaskRegistry>,
        sink: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Self {
        let keys = config.keys();
        let queue = PendingQueue::new(Arc::clone(&store), keys.queue_key());
        Self {
            store,
            queue,
            keys,
            registry,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process at most one pending chain within `budget`.
    ///
    /// Never fails: every path, including store errors and task panics, is
    /// reported as a `ChainOutcome`.
    ///
    /// `Duration::MAX` (or any oversized budget) means "no practical limit".
    /// When the budget runs out, in-flight tasks are signalled and dropped
    /// without waiting for `cancel_grace_ms`, so the call returns shortly
    /// after the budget ends; `cancel_grace_ms` applies only to per-task
    /// timeouts.
    ///
    /// Precondition: no other `process_one` runs against the same store at the
    /// same time. Overlapping calls can dequeue the same chain twice.
    pub async fn process_one(&self, budget: Duration) -> ChainOutcome {
        let deadline = deadline_after(Instant::now(), budget);

        let chain_id = match self.queue.dequeue_next().await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("pending queue is empty");
                return ChainOutcome::NoOp;
            }
            Err(err) => {
                error!(error = %err, "failed to dequeue next chain");
                return ChainOutcome::StoreFailure {
                    chain_id: None,
                    reason: err.to_string(),
                };
            }
        };

        let span = info_span!("chain", chain_id = %chain_id);
        async move {
            let definition = match self.load_definition(&chain_id).await {
                Ok(definition) => definition,
                Err(outcome) => return outcome,
            };

            // 実行前に定義を消す。ここで落ちたチェーンは復旧されない（Abandoned）。
            let key = self.keys.definition_key(&chain_id);
            if let Err(err) = self.store.delete(&key).await {
                warn!(error = %err, "failed to delete chain definition before execution");
            }

            let outcome = self.run_chain(&definition, deadline).await;
            match &outcome {
                ChainOutcome::Succeeded { .. } => info!("chain succeeded"),
                ChainOutcome::Failed {
                    step_index, task, ..
                } => warn!(
                    step = step_index,
                    task = %task.kind,
                    detail = %task.detail,
                    "chain failed"
                ),
                other => debug!(outcome = other.label(), "chain finished"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Load and decode the definition; any permanent problem removes it and
    /// yields the terminal outcome instead.
    async fn load_definition(&self, chain_id: &ChainId) -> Result<ChainDefinition, ChainOutcome> {
        let key = self.keys.definition_key(chain_id);
        let bytes = match self.store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!("queued chain has no stored definition; dropping it");
                return Err(ChainOutcome::DefinitionMissing {
                    chain_id: chain_id.clone(),
                });
            }
            Err(err) => {
                error!(error = %err, "failed to read chain definition");
                return Err(ChainOutcome::StoreFailure {
                    chain_id: Some(chain_id.clone()),
                    reason: err.to_string(),
                });
            }
        };

        let reason = match ChainCodec::decode(&bytes) {
            Ok(definition) if definition.id() != chain_id => format!(
                "stored definition belongs to chain {}",
                definition.id()
            ),
            Ok(definition) => match self.config.max_steps_per_chain {
                Some(max) if definition.step_count() > max => format!(
                    "chain has {} steps, more than the allowed {max}",
                    definition.step_count()
                ),
                _ => return Ok(definition),
            },
            Err(err) => err.to_string(),
        };

        error!(reason = %reason, "corrupt chain definition; dropping it");
        if let Err(err) = self.store.delete(&key).await {
            warn!(error = %err, "failed to delete corrupt chain definition");
        }
        Err(ChainOutcome::CorruptDefinition {
            chain_id: chain_id.clone(),
            reason,
        })
    }

    async fn run_chain(&self, definition: &ChainDefinition, deadline: Instant) -> ChainOutcome {
        let chain_id = definition.id().clone();
        // 呼び出しが終わったら、取り残されたタスクにもキャンセルを伝える
        let invocation = CancellationToken::new();
        let _guard = invocation.clone().drop_guard();

        for (step_index, step) in definition.steps().iter().enumerate() {
            if Instant::now() >= deadline {
                warn!(step = step_index, "invocation budget exhausted before step started");
                let first = &step.tasks()[0];
                return ChainOutcome::Failed {
                    chain_id,
                    step_index,
                    task: TaskOutcome::failure(
                        first.kind.clone(),
                        FailureKind::Cancelled,
                        "invocation budget exhausted before step started",
                    ),
                };
            }

            let outcomes = self.run_step(step_index, step, deadline, &invocation).await;
            for outcome in &outcomes {
                self.sink.emit(CompletionEvent::from(outcome));
            }

            if let Some(failed) = outcomes.into_iter().find(|o| !o.success) {
                return ChainOutcome::Failed {
                    chain_id,
                    step_index,
                    task: failed,
                };
            }
        }

        ChainOutcome::Succeeded { chain_id }
    }

    /// Run every task of the step concurrently and wait for all of them.
    /// Outcomes are returned in declaration order.
    async fn run_step(
        &self,
        step_index: usize,
        step: &Step,
        deadline: Instant,
        invocation: &CancellationToken,
    ) -> Vec<TaskOutcome> {
        debug!(step = step_index, tasks = step.len(), "starting step");

        let handles: Vec<_> = step
            .tasks()
            .iter()
            .map(|spec| {
                let run = TaskRun {
                    spec: spec.clone(),
                    timeout: spec
                        .max_run()
                        .unwrap_or_else(|| self.config.per_task_timeout()),
                    invocation_deadline: deadline,
                    cancel_grace: self.config.cancel_grace(),
                    cancel: invocation.child_token(),
                };
                let registry = Arc::clone(&self.registry);
                let handle = tokio::spawn(
                    run_task(registry, run).instrument(info_span!("task", step = step_index)),
                );
                (spec.kind.clone(), handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (kind, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    error!(task = %kind, error = %join_err, "task panicked");
                    TaskOutcome::failure(
                        kind,
                        FailureKind::Panicked,
                        format!("task panicked: {join_err}"),
                    )
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}
