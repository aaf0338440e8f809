//! BroadcastEventSink - tokio broadcast による複数購読者への配信
//!
//! # 特性
//! - `emit` はブロックしない（broadcast::Sender::send は同期）
//! - 購読者がいなければイベントは捨てられる
//! - 遅れた購読者は古いイベントから取りこぼす（`RecvError::Lagged`）

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::CompletionEvent;
use crate::ports::EventSink;

#[derive(Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<CompletionEvent>,
}

impl BroadcastEventSink {
    /// `capacity` must be greater than zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CompletionEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, event: CompletionEvent) {
        if let Err(broadcast::error::SendError(event)) = self.tx.send(event) {
            trace!(name = %event.name, "no subscribers; completion event dropped");
        }
    }
}

/// EventSink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: CompletionEvent) {}
}
