//! DurableStore port - ホストが提供する永続 KV ストア
//!
//! エンジンはこの trait にだけ依存します。具体的な保存技術
//! （ファイル、SQLite、プラットフォームの設定ストアなど）は実装側の責務です。
//!
//! # 設計原則
//! - 各操作は独立した呼び出し（複数呼び出しにまたがる原子性は仮定しない）
//! - 値は不透明なバイト列
//! - `list_with_prefix` はキーを昇順で返す

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store data is malformed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
