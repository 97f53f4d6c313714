//! CLI argument layer, gated behind the `cli-args` feature so library
//! consumers that never touch `clap` don't pay for it.

use std::path::PathBuf;

use clap::Args;

/// Logging flags, mirroring `vertex-node-core::args::log::LogArgs` with the
/// file-rotation fields dropped (this library has no standing log file).
#[derive(Debug, Args, Clone)]
#[command(next_help_heading = "Logging")]
pub struct LogArgs {
    /// Silence all output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Log filter directive (e.g. "snrr_rpc=debug,snrr_dispatch=trace").
    #[arg(long = "log.filter", value_name = "DIRECTIVE")]
    pub filter: Option<String>,

    /// Use JSON-formatted log output.
    #[arg(long = "log.json")]
    pub json: bool,
}

impl From<LogArgs> for crate::config::LogConfig {
    fn from(args: LogArgs) -> Self {
        Self {
            quiet: args.quiet,
            verbosity: args.verbosity,
            filter: args.filter,
            json: args.json,
        }
    }
}

/// The five enumerated options from spec.md §6, as CLI overrides layered on
/// top of [`crate::config::SnrrConfig`]. Every field is `Option` (or an
/// empty default) so "not passed" is distinguishable from "explicitly set
/// to the default value" — the same `apply_args` shape the teacher's
/// `FullNodeConfig::apply_args` uses.
#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Router")]
pub struct ConfigArgs {
    /// Run against the testnet instead of mainnet.
    #[arg(long)]
    pub testnet: Option<bool>,

    /// Per-call HTTP timeout, in seconds.
    #[arg(long = "http-timeout")]
    pub http_timeout_seconds: Option<u64>,

    /// Maximum retry attempts for an RPC call.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Directory for persisted pool/swarm/clock state.
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Overlay transport layers to enable, e.g. `--layer onion --layer direct`.
    #[arg(long = "layer", value_name = "LAYER")]
    pub layers: Vec<String>,
}
