//! JsonFileStore - 単一の JSON ファイルに保存する DurableStore
//!
//! ホストプロセスが起動・終了を繰り返しても内容が残るので、
//! CLI ドライバのような「短時間だけ起動される」ホスト向けです。
//!
//! # 実装詳細
//! - open 時にファイル全体をメモリに読み込む（無ければ空）
//! - 変更のたびに一時ファイルへ書き出して rename（途中で落ちても旧内容が残る）
//! - 書き込みに成功してからメモリ上の内容を差し替える（失敗時は何も変わらない）
//! - 同一プロセス内の操作は Mutex で直列化
//! - 複数プロセスからの同時利用は想定しない

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::ports::{DurableStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FileContents {
    entries: BTreeMap<String, Vec<u8>>,
}

pub struct JsonFileStore {
    path: PathBuf,
    contents: Mutex<FileContents>,
}

impl JsonFileStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let contents = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Malformed(format!("{}: {e}", path.display())))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => FileContents::default(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), entries = contents.entries.len(), "opened file store");
        Ok(Self {
            path,
            contents: Mutex::new(contents),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, contents: &FileContents) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(contents)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DurableStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.contents.lock().await.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut contents = self.contents.lock().await;
        let mut next = contents.clone();
        next.entries.insert(key.to_string(), value);
        self.persist(&next).await?;
        *contents = next;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut contents = self.contents.lock().await;
        if !contents.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = contents.clone();
        next.entries.remove(key);
        self.persist(&next).await?;
        *contents = next;
        Ok(())
    }

    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let contents = self.contents.lock().await;
        Ok(contents
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn contents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.set("chain_def_a", b"one".to_vec()).await.unwrap();
            store.set("chain_def_b", b"two".to_vec()).await.unwrap();
            store.delete("chain_def_b").await.unwrap();
        }

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.get("chain_def_a").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.get("chain_def_b").await.unwrap(), None);
        assert_eq!(
            store.list_with_prefix("chain_def_").await.unwrap(),
            vec!["chain_def_a"]
        );
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("absent.json")).await.unwrap();
        assert!(store.list_with_prefix("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"not json").unwrap();

        let err = JsonFileStore::open(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn failed_write_leaves_contents_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("missing_dir").join("store.json"))
            .await
            .unwrap();

        assert!(store.set("k", b"v".to_vec()).await.is_err());
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.list_with_prefix("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let store = JsonFileStore::open(sub.join("store.json")).await.unwrap();
        store.set("k", b"v".to_vec()).await.unwrap();

        std::fs::remove_dir_all(&sub).unwrap();
        assert!(store.delete("k").await.is_err());
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
    }
}
