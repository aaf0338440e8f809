//! Errors - エラー型
//!
//! 構築時・永続化時のエラーだけを扱います。タスク実行中のエラーは
//! `TaskOutcome` に変換され、`process_one` の外には出ません。

use thiserror::Error;

use crate::codec::CodecError;
use crate::ports::StoreError;

use super::task::TaskKind;

#[derive(Debug, Error)]
pub enum WeftError {
    #[error("invalid chain: {0}")]
    InvalidChain(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("task kind '{0}' is already registered")]
    DuplicateTaskKind(TaskKind),

    #[error("Missing task kinds: {0:?}. These kinds were expected but not registered.")]
    MissingTaskKinds(Vec<String>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WeftError>;
