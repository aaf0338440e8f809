#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use weft_core::impls::InMemoryStore;
use weft_core::ports::{DurableStore, StoreError};
use weft_core::{CompletionEvent, EngineBuilder, Task, TaskContext, TaskError};

/// Shared log of task kinds in the order they finished running.
#[derive(Clone, Default)]
pub struct RunLog(Arc<Mutex<Vec<String>>>);

impl RunLog {
    pub fn push(&self, kind: &str) {
        self.0.lock().unwrap().push(kind.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.0.lock().unwrap().iter().any(|k| k == kind)
    }
}

/// Sleeps for `delay`, records itself, then succeeds or fails.
pub struct ScriptedTask {
    pub log: RunLog,
    pub delay: Duration,
    pub fail_with: Option<&'static str>,
}

#[async_trait]
impl Task for ScriptedTask {
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.log.push(ctx.kind().as_str());
        match self.fail_with {
            Some(message) => Err(TaskError::failed(message)),
            None => Ok(()),
        }
    }
}

/// Never finishes and ignores the cancellation signal.
pub struct HangingTask;

#[async_trait]
impl Task for HangingTask {
    async fn run(&self, _ctx: TaskContext) -> Result<(), TaskError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Waits for the cancellation signal and then stops.
pub struct CooperativeTask {
    pub stopped: Arc<AtomicUsize>,
}

#[async_trait]
impl Task for CooperativeTask {
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
        ctx.cancelled().await;
        self.stopped.fetch_add(1, Ordering::SeqCst);
        Err(TaskError::Cancelled)
    }
}

pub struct PanickingTask;

#[async_trait]
impl Task for PanickingTask {
    async fn run(&self, _ctx: TaskContext) -> Result<(), TaskError> {
        panic!("task blew up");
    }
}

/// Register a `ScriptedTask` for `kind`.
pub fn scripted(
    builder: EngineBuilder,
    kind: &str,
    log: &RunLog,
    delay: Duration,
    fail_with: Option<&'static str>,
) -> EngineBuilder {
    let log = log.clone();
    builder
        .register_task(kind, move || {
            Arc::new(ScriptedTask {
                log: log.clone(),
                delay,
                fail_with,
            }) as Arc<dyn Task>
        })
        .unwrap()
}

pub fn drain(rx: &mut broadcast::Receiver<CompletionEvent>) -> Vec<CompletionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Store wrapper that counts mutations.
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: InMemoryStore,
    pub writes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.inner.list_with_prefix(prefix).await
    }
}

/// Store wrapper whose reads return their value only after `delay`, widening
/// the window between the queue read and the queue write.
#[derive(Clone)]
pub struct SlowReadStore {
    pub inner: InMemoryStore,
    pub delay: Duration,
}

#[async_trait]
impl DurableStore for SlowReadStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self.inner.get(key).await;
        tokio::time::sleep(self.delay).await;
        value
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }

    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.inner.list_with_prefix(prefix).await
    }
}

/// Store that fails every operation.
pub struct BrokenStore;

#[async_trait]
impl DurableStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    async fn list_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }
}
