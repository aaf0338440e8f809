// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `weft`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "weft",
    version,
    about = "Enqueue task chains into a file-backed store and run them one invocation at a time.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the JSON store file. Created on first write.
    #[arg(long, global = true, value_name = "PATH", default_value = "weft-store.json")]
    pub store: PathBuf,

    /// Engine config (TOML). Defaults are used when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WEFT_LOG` or `info` is used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Append a chain to the pending queue.
    ///
    /// Each STEP is a comma-separated list of tasks run concurrently; steps
    /// run in the given order. A task is `kind` or `kind=payload`, where the
    /// payload is JSON or else taken as a plain string.
    ///
    /// Example: `weft enqueue demo.hello=alice demo.sleep=200,demo.hello`
    Enqueue {
        /// Use this chain id instead of a generated one.
        #[arg(long, value_name = "ID")]
        id: Option<String>,

        /// Per-task run limit in milliseconds, applied to every task.
        #[arg(long, value_name = "MS")]
        max_run_ms: Option<u64>,

        #[arg(value_name = "STEP", required = true)]
        steps: Vec<String>,
    },

    /// Process at most one pending chain.
    Run {
        /// Invocation budget in milliseconds.
        #[arg(long, value_name = "MS", default_value_t = 30_000)]
        budget_ms: u64,
    },

    /// Print the pending queue and stored definitions.
    Status,

    /// Delete stored definitions that are not queued.
    PurgeOrphans,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
