//! Chain identifiers.
//!
//! # ChainId は不透明な文字列
//! ストア上のキー（`chain_def_<id>`）とキューのエントリにそのまま使われるため、
//! 文字列として保持します。エンジン自身が生成する場合は ULID を使います
//! （`IdGenerator` 参照）。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: timestamp が先頭にあるため、生成順序でソートできる
//! - **分散生成可能**: 調整なしで生成できる
//! - **キー安全**: Crockford base32 なので区切り文字を含まない

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of a chain (enqueue / dequeue / definition-key unit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// ULID から ChainId を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Ulid> for ChainId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChainId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ulid_ids_are_sortable() {
        // ULID は時刻ベースなので、生成順序でソート可能
        let id1 = ChainId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = ChainId::from_ulid(Ulid::new());

        assert!(id1 < id2);
    }

    #[test]
    fn chain_id_serializes_transparently() {
        let id = ChainId::new("nightly-sync");
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "\"nightly-sync\"");

        let back: ChainId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn from_ulid_keeps_canonical_text() {
        let ulid = Ulid::new();
        let id: ChainId = ulid.into();
        assert_eq!(id.as_str(), ulid.to_string());
        assert_eq!(id.to_string().len(), 26);
    }
}
