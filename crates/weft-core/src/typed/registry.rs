//! TypedRegistry - Task コンストラクタの登録と管理
//!
//! 起動時に一度だけ構築し、実行時は読み取り専用で使います
//! （ロック不要）。kind ごとに「Task を作る関数」を保持し、
//! `create_task` のたびに新しいインスタンスを作ります。
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Generic methods での登録と型安全性（`P::KIND` がキー）
//! - Arc による共有所有権

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{Handler, Payload, TypedTask};
use super::task::Task;
use crate::domain::{TaskKind, WeftError};
use crate::ports::TaskRegistry;

/// Constructor stored per task kind.
pub type TaskFactory = Arc<dyn Fn() -> Arc<dyn Task> + Send + Sync>;

/// TypedRegistry は task kind → コンストラクタの対応を管理
///
/// # 使用例
/// ```ignore
/// let mut registry = TypedRegistry::new();
/// registry.register::<Upload, _>(|| UploadHandler::new())?;
///
/// let task = registry.create_task(&TaskKind::new(Upload::KIND));
/// ```
#[derive(Default)]
pub struct TypedRegistry {
    factories: HashMap<TaskKind, TaskFactory>,
}

impl TypedRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a typed handler; the payload type's `KIND` is the key.
    pub fn register<P, H>(
        &mut self,
        factory: impl Fn() -> H + Send + Sync + 'static,
    ) -> Result<(), WeftError>
    where
        P: Payload,
        H: Handler<P> + 'static,
    {
        self.register_task(TaskKind::new(P::KIND), move || {
            Arc::new(TypedTask::<P, H>::new(factory())) as Arc<dyn Task>
        })
    }

    /// Register an untyped task working on raw payload bytes.
    pub fn register_task(
        &mut self,
        kind: impl Into<TaskKind>,
        factory: impl Fn() -> Arc<dyn Task> + Send + Sync + 'static,
    ) -> Result<(), WeftError> {
        let kind = kind.into();
        if self.factories.contains_key(&kind) {
            return Err(WeftError::DuplicateTaskKind(kind));
        }
        self.factories.insert(kind, Arc::new(factory));
        Ok(())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(&TaskKind::new(kind))
    }

    /// Registered kinds, sorted.
    pub fn registered_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .factories
            .keys()
            .map(|k| k.as_str().to_string())
            .collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl TaskRegistry for TypedRegistry {
    fn create_task(&self, kind: &TaskKind) -> Option<Arc<dyn Task>> {
        self.factories.get(kind).map(|factory| factory())
    }
}
