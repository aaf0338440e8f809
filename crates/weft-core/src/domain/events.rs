//! Events - 観測用イベント
//!
//! CompletionEvent はタスクごとの結果を EventSink に流します。
//! ベストエフォートの通知であり、正しさの判断には使いません。

use serde::{Deserialize, Serialize};

use super::outcome::TaskOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub name: String,
    pub success: bool,
    pub message: String,
}

impl CompletionEvent {
    pub fn new(name: impl Into<String>, success: bool, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success,
            message: message.into(),
        }
    }
}

impl From<&TaskOutcome> for CompletionEvent {
    fn from(outcome: &TaskOutcome) -> Self {
        Self::new(outcome.kind.as_str(), outcome.success, outcome.detail.clone())
    }
}
