//! TaskRegistry port - task kind から実行可能な Task を解決
//!
//! # 契約
//! - 未知の kind は `None` を返す（panic もエラーも返さない）
//! - 呼び出しごとに新しい Task インスタンスを返してよい

use std::sync::Arc;

use crate::domain::TaskKind;
use crate::typed::Task;

pub trait TaskRegistry: Send + Sync {
    fn create_task(&self, kind: &TaskKind) -> Option<Arc<dyn Task>>;
}
