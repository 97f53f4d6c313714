//! Argument parsing for the demo binary, composing `snrr-core`'s flattened
//! logging and router argument groups the same way the teacher's
//! `node/commands::cli::Cli` flattens `LogArgs` alongside its own args.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snrr_core::cli::{ConfigArgs, LogArgs};

/// Service-Node Request Router demo binary.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub logs: LogArgs,

    #[command(flatten)]
    pub router: ConfigArgs,

    /// Path to a TOML config file; CLI flags above still override it.
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Hex-encoded 32-byte ed25519 seed for a stable identity. A fresh
    /// random identity is used if omitted.
    #[arg(long, value_name = "HEX")]
    pub seed: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bootstrap the snode pool and print one snode's reported clock.
    Info,
    /// Resolve a Session Name (ONS) to a session id.
    ResolveOns { name: String },
    /// Store a UTF-8 string under the active identity's own account.
    Store {
        data: String,
        #[arg(long, default_value_t = 86_400_000)]
        ttl_ms: i64,
    },
    /// Retrieve messages from the active identity's default namespace.
    Retrieve,
}
