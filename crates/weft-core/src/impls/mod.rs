//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryStore**: 開発・テスト用の DurableStore
//! - **JsonFileStore**: 単一ファイルに永続化する DurableStore
//! - **BroadcastEventSink / NoopEventSink**: EventSink
//!
//! 本番のストア（プラットフォームの KV、SQLite など）はホスト側で
//! `DurableStore` を実装して差し込みます。

pub mod broadcast_sink;
pub mod file_store;
pub mod memory_store;

pub use self::broadcast_sink::{BroadcastEventSink, NoopEventSink};
pub use self::file_store::JsonFileStore;
pub use self::memory_store::InMemoryStore;
