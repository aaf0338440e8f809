//! App - アプリケーション層
//!
//! このモジュールは ports を組み合わせてエンジンを実装します。
//!
//! # 主要コンポーネント
//! - **EngineBuilder / Engine**: 構築とワイヤリング
//! - **ChainScheduler / ChainBuilder**: チェーンの構築と投入
//! - **ChainExecutor**: `process_one`（dequeue→load→delete→run steps）
//! - **EngineStatus**: キューと保存済み定義のスナップショット

pub mod builder;
pub mod executor;
pub mod scheduler;
pub mod status;
mod task_runner;

pub use self::builder::{Engine, EngineBuilder};
pub use self::executor::ChainExecutor;
pub use self::scheduler::{ChainBuilder, ChainScheduler};
pub use self::status::EngineStatus;
pub use self::task_runner::UNKNOWN_TASK_KIND;
