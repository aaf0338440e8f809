//! Handler trait - 型付きペイロードを処理する Handler の定義
//!
//! # 二層構造
//! - **表層（Typed）**: `Payload` + `Handler<P>` - 型安全
//! - **内部（Dyn）**: `Task` - object-safe、レジストリに格納される
//!
//! `TypedTask<P, H>` がペイロードのバイト列を JSON として `P` に decode し、
//! `Handler<P>` を呼び出します（Type erasure パターン）。

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::task::{Task, TaskContext, TaskError};

/// Payload は task kind と型を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Upload {
///     path: String,
/// }
///
/// impl Payload for Upload {
///     const KIND: &'static str = "acme.sync.upload.v1";
/// }
/// ```
///
/// # 命名規約
/// - `{namespace}.{domain}.{action}.v{major}`
pub trait Payload: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: &'static str;
}

/// Handler は型付きペイロードを受け取ってタスクを実行する
///
/// # 使用例
/// ```ignore
/// struct UploadHandler;
///
/// #[async_trait]
/// impl Handler<Upload> for UploadHandler {
///     async fn handle(&self, payload: Upload, ctx: &TaskContext) -> Result<(), TaskError> {
///         upload(&payload.path).await.map_err(|e| TaskError::failed(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<P: Payload>: Send + Sync {
    async fn handle(&self, payload: P, ctx: &TaskContext) -> Result<(), TaskError>;
}

pub struct TypedTask<P: Payload, H: Handler<P>> {
    handler: H,
    _marker: PhantomData<fn() -> P>,
}

impl<P: Payload, H: Handler<P>> TypedTask<P, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<P: Payload, H: Handler<P>> Task for TypedTask<P, H> {
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
        // ペイロードなしは JSON の null として扱う（unit struct や Option で受けられる）
        let bytes = ctx.payload().unwrap_or(b"null".as_slice());
        let payload: P =
            serde_json::from_slice(bytes).map_err(|e| TaskError::Payload(e.to_string()))?;
        self.handler.handle(payload, &ctx).await
    }
}
