// src/demo.rs

//! Demo task kinds registered by the `weft` binary.
//!
//! - `demo.hello`: prints a greeting (payload: optional name)
//! - `demo.sleep`: sleeps for the given milliseconds, stopping early when
//!   cancelled
//! - `demo.fail`: always fails (payload: optional reason)

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use weft_core::{EngineBuilder, Handler, Payload, TaskContext, TaskError, WeftError};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hello(pub Option<String>);

impl Payload for Hello {
    const KIND: &'static str = "demo.hello";
}

struct HelloHandler;

#[async_trait]
impl Handler<Hello> for HelloHandler {
    async fn handle(&self, payload: Hello, _ctx: &TaskContext) -> Result<(), TaskError> {
        let name = payload.0.as_deref().unwrap_or("world");
        println!("Hello, {name}!");
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sleep(pub u64);

impl Payload for Sleep {
    const KIND: &'static str = "demo.sleep";
}

struct SleepHandler;

#[async_trait]
impl Handler<Sleep> for SleepHandler {
    async fn handle(&self, payload: Sleep, ctx: &TaskContext) -> Result<(), TaskError> {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(payload.0)) => Ok(()),
            _ = ctx.cancelled() => Err(TaskError::Cancelled),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fail(pub Option<String>);

impl Payload for Fail {
    const KIND: &'static str = "demo.fail";
}

struct FailHandler;

#[async_trait]
impl Handler<Fail> for FailHandler {
    async fn handle(&self, payload: Fail, _ctx: &TaskContext) -> Result<(), TaskError> {
        Err(TaskError::failed(
            payload.0.unwrap_or_else(|| "intentional failure".to_string()),
        ))
    }
}

/// Register every demo kind on `builder`.
pub fn register(builder: EngineBuilder) -> Result<EngineBuilder, WeftError> {
    Ok(builder
        .register::<Hello, _>(|| HelloHandler)?
        .register::<Sleep, _>(|| SleepHandler)?
        .register::<Fail, _>(|| FailHandler)?
        .expect_kinds(&[Hello::KIND, Sleep::KIND, Fail::KIND]))
}
