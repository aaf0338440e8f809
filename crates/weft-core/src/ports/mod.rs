//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! エンジンは外部（永続ストア、タスク実装、イベント購読者）に
//! これらの trait を通してのみアクセスします。

pub mod clock;
pub mod event_sink;
pub mod id_generator;
pub mod registry;
pub mod store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::registry::TaskRegistry;
pub use self::store::{DurableStore, StoreError};
