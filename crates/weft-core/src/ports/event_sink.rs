//! EventSink port - 完了イベントの通知先
//!
//! エグゼキュータのコンストラクタに注入されます（グローバルなイベントバスは使わない）。
//!
//! # 設計原則
//! - `emit` は同期かつ非ブロッキング
//! - 購読者がいない・バッファが一杯ならイベントは捨ててよい

use crate::domain::CompletionEvent;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: CompletionEvent);
}
