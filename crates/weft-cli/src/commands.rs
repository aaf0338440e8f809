// src/commands.rs

//! Subcommand implementations. Every command opens the store, builds an
//! engine with the demo kinds and performs a single operation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{debug, info};
use weft_core::impls::JsonFileStore;
use weft_core::{Constraints, Engine, EngineBuilder, EngineConfig, TaskSpec};

use crate::cli::{CliArgs, Command};
use crate::demo;

pub async fn run(args: CliArgs) -> Result<()> {
    let engine = build_engine(&args).await?;

    match args.command {
        Command::Enqueue {
            id,
            max_run_ms,
            steps,
        } => enqueue(&engine, id, max_run_ms, &steps).await,
        Command::Run { budget_ms } => run_once(&engine, Duration::from_millis(budget_ms)).await,
        Command::Status => status(&engine).await,
        Command::PurgeOrphans => purge_orphans(&engine).await,
    }
}

async fn build_engine(args: &CliArgs) -> Result<Engine> {
    let config = match &args.config {
        Some(path) => EngineConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let store = JsonFileStore::open(&args.store)
        .await
        .with_context(|| format!("failed to open store {}", args.store.display()))?;
    debug!(store = %args.store.display(), "store opened");

    let builder = EngineBuilder::new()
        .with_config(config)
        .with_store(Arc::new(store));
    Ok(demo::register(builder)?.build()?)
}

async fn enqueue(
    engine: &Engine,
    id: Option<String>,
    max_run_ms: Option<u64>,
    steps: &[String],
) -> Result<()> {
    let constraints =
        max_run_ms.map(|ms| Constraints::default().with_max_run(Duration::from_millis(ms)));
    let mut parsed = Vec::with_capacity(steps.len());
    for raw in steps {
        let mut tasks = parse_step(raw)?;
        if let Some(constraints) = &constraints {
            tasks = tasks
                .into_iter()
                .map(|task| task.with_constraints(constraints.clone()))
                .collect();
        }
        parsed.push(tasks);
    }

    let mut parsed = parsed.into_iter();
    let Some(first) = parsed.next() else {
        bail!("a chain needs at least one step");
    };
    let mut chain = engine.begin_with_all(first)?;
    if let Some(id) = id {
        chain = chain.with_id(id);
    }
    for tasks in parsed {
        chain.then_all(tasks)?;
    }

    let chain_id = chain.enqueue().await?;
    info!(chain_id = %chain_id, "chain enqueued");
    println!("{chain_id}");
    Ok(())
}

async fn run_once(engine: &Engine, budget: Duration) -> Result<()> {
    let mut events = engine.subscribe();
    let outcome = engine.process_one(budget).await;

    if let Some(rx) = events.as_mut() {
        while let Ok(event) = rx.try_recv() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn status(engine: &Engine) -> Result<()> {
    let status = engine.status().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn purge_orphans(engine: &Engine) -> Result<()> {
    let removed = engine.scheduler().purge_orphans().await?;
    info!(removed, "orphaned definitions purged");
    println!("{removed}");
    Ok(())
}

/// `kind[=payload],kind[=payload],...` into the tasks of one step.
fn parse_step(raw: &str) -> Result<Vec<TaskSpec>> {
    raw.split(',').map(parse_task).collect()
}

fn parse_task(raw: &str) -> Result<TaskSpec> {
    let raw = raw.trim();
    let (kind, payload) = match raw.split_once('=') {
        Some((kind, payload)) => (kind.trim(), Some(payload)),
        None => (raw, None),
    };
    if kind.is_empty() {
        bail!("task without a kind in {raw:?}");
    }

    let spec = TaskSpec::new(kind);
    let Some(payload) = payload else {
        return Ok(spec);
    };
    // JSON として読めなければ文字列として扱う
    let bytes = match serde_json::from_str::<Value>(payload) {
        Ok(_) => payload.as_bytes().to_vec(),
        Err(_) => serde_json::to_vec(&Value::String(payload.to_string()))?,
    };
    Ok(spec.with_payload(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_task_without_payload() {
        let spec = parse_task("demo.hello").unwrap();
        assert_eq!(spec.kind.as_str(), "demo.hello");
        assert!(spec.payload.is_none());
    }

    #[test]
    fn parse_task_keeps_json_payload() {
        let spec = parse_task("demo.sleep=250").unwrap();
        assert_eq!(spec.payload.as_deref(), Some(b"250".as_slice()));
    }

    #[test]
    fn parse_task_quotes_plain_text() {
        let spec = parse_task("demo.hello=alice").unwrap();
        assert_eq!(spec.payload.as_deref(), Some(br#""alice""#.as_slice()));
    }

    #[test]
    fn parse_step_splits_on_commas() {
        let tasks = parse_step("demo.hello, demo.sleep=5").unwrap();
        let kinds: Vec<_> = tasks.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["demo.hello", "demo.sleep"]);
    }

    #[test]
    fn empty_kind_is_rejected() {
        assert!(parse_step("demo.hello,").is_err());
        assert!(parse_task("=1").is_err());
    }

    #[tokio::test]
    async fn enqueue_and_run_against_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let args = |command| CliArgs {
            store: dir.path().join("store.json"),
            config: None,
            log_level: None,
            command,
        };

        run(args(Command::Enqueue {
            id: Some("demo-1".to_string()),
            max_run_ms: None,
            steps: vec!["demo.hello=alice".to_string(), "demo.sleep=1".to_string()],
        }))
        .await
        .unwrap();

        let engine = build_engine(&args(Command::Status)).await.unwrap();
        assert_eq!(engine.queue_size().await.unwrap(), 1);
        drop(engine);

        run(args(Command::Run { budget_ms: 5_000 })).await.unwrap();
        let engine = build_engine(&args(Command::Status)).await.unwrap();
        let status = engine.status().await.unwrap();
        assert!(status.pending.is_empty());
        assert_eq!(status.stored_definitions, 0);
    }
}
