//! Typed - 型付き Task API
//!
//! このモジュールは task kind の typo を型で排除し、
//! Handler との対応付けを静的に保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Payload` trait, `Handler<P>` trait - 型安全
//! - **内部（Dyn）**: `Task` trait - object-safe, type erasure

pub mod handler;
pub mod registry;
pub mod task;

pub use self::handler::{Handler, Payload, TypedTask};
pub use self::registry::{TaskFactory, TypedRegistry};
pub use self::task::{Task, TaskContext, TaskError};
