//! Task trait - エンジンが実行する単位
//!
//! # キャンセル契約
//! - エンジンはタスクごとの期限（`TaskContext::deadline`）を決める
//! - 期限を過ぎると `TaskContext::cancelled()` が完了する（協調的キャンセル）
//! - タスクはシグナルを見て早めに戻るべき。戻らなくても結果は timeout として扱われる

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::TaskKind;

/// Error returned by a task. Converted into a failed `TaskOutcome` by the
/// executor; it never escapes `process_one`.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("cancelled")]
    Cancelled,

    #[error("payload decode: {0}")]
    Payload(String),
}

impl TaskError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Input handed to a running task.
#[derive(Debug, Clone)]
pub struct TaskContext {
    kind: TaskKind,
    payload: Option<Vec<u8>>,
    cancel: CancellationToken,
    deadline: Instant,
}

impl TaskContext {
    pub fn new(
        kind: TaskKind,
        payload: Option<Vec<u8>>,
        cancel: CancellationToken,
        deadline: Instant,
    ) -> Self {
        Self {
            kind,
            payload,
            cancel,
            deadline,
        }
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> std::time::Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes once the engine has asked the task to stop.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Object-safe task contract.
///
/// Most applications implement `Handler<P>` for a typed payload instead and
/// let the registry adapt it; implement `Task` directly to work with the raw
/// payload bytes.
#[async_trait]
pub trait Task: Send + Sync {
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn context_reports_remaining_time_and_cancellation() {
        let token = CancellationToken::new();
        let ctx = TaskContext::new(
            TaskKind::new("t"),
            Some(b"abc".to_vec()),
            token.clone(),
            Instant::now() + Duration::from_secs(5),
        );

        assert_eq!(ctx.payload(), Some(&b"abc"[..]));
        assert_eq!(ctx.remaining(), Duration::from_secs(5));
        assert!(!ctx.is_cancelled());

        token.cancel();
        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
    }
}
