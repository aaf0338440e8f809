//! weft-core
//!
//! Durable chain-execution engine: ordered steps of concurrently running
//! tasks, persisted through a host-supplied key/value store and processed one
//! chain per invocation within a bounded time budget.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ChainId, TaskSpec, Step, ChainDefinition, outcomes, events, errors）
//! - **ports**: 抽象化レイヤー（DurableStore, TaskRegistry, EventSink, Clock, IdGenerator）
//! - **codec**: ChainDefinition ⇔ bytes
//! - **queue**: ストア上の FIFO キュー（PendingQueue）とキー配置
//! - **app**: アプリケーションロジック（EngineBuilder, ChainScheduler, ChainExecutor）
//! - **typed**: 型付き Task API（Task trait, Handler trait, TypedRegistry）
//! - **impls**: 実装（InMemoryStore, JsonFileStore, BroadcastEventSink）
//! - **config**: EngineConfig（TOML から読み込み可能）

pub mod app;
pub mod codec;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;
pub mod typed;

pub use app::{ChainBuilder, ChainExecutor, ChainScheduler, Engine, EngineBuilder, EngineStatus};
pub use config::EngineConfig;
pub use domain::{
    ChainDefinition, ChainId, ChainOutcome, CompletionEvent, Constraints, FailureKind,
    NetworkType, Step, TaskKind, TaskOutcome, TaskSpec, WeftError,
};
pub use typed::{Handler, Payload, Task, TaskContext, TaskError};
