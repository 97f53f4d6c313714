//! Demo/ops binary exercising `snrr-core` end to end, in the spirit of the
//! teacher's trivial `bin/vertex::main` entry point rather than its fuller
//! `SwarmCli`/`LaunchContext` machinery — this crate has one identity and
//! one router, not a multi-node launch surface.

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cli::Command;
use eyre::{eyre, WrapErr};
use snrr_core::{CoreContextBuilder, SnrrConfig};
use snrr_crypto::{Ed25519Signer, Signer};
use snrr_primitives::{AccountId, Namespace};
use snrr_storage::{Persistence, RedbPersistence};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = cli::Cli::parse();

    let mut config = SnrrConfig::load(cli.config_file.as_deref())?;
    config.apply_args(&cli.router);
    config.log = cli.logs.clone().into();
    snrr_core::logging::init_logging(&config.log);

    let signer: Arc<dyn Signer> = Arc::new(match cli.seed {
        Some(hex_seed) => {
            let bytes = hex::decode(&hex_seed).wrap_err("seed must be hex-encoded")?;
            let seed: [u8; 32] = bytes
                .try_into()
                .map_err(|_| eyre!("seed must decode to exactly 32 bytes"))?;
            Ed25519Signer::from_seed(seed)
        }
        None => Ed25519Signer::random(),
    });
    let account = AccountId::from_hex(format!("05{}", hex::encode(signer.x25519_public())));
    tracing::info!(account = %account, "active identity");

    std::fs::create_dir_all(&config.data_dir)
        .wrap_err_with(|| format!("creating data dir {}", config.data_dir.display()))?;
    let storage: Arc<dyn Persistence> =
        Arc::new(RedbPersistence::open(db_path(&config.data_dir))?);

    let ctx = CoreContextBuilder::new(config, signer, storage).build();
    ctx.load_persisted_state().await?;

    match cli.command {
        Command::Info => {
            let snode = pick_snode(&ctx).await?;
            let server_time_ms = ctx.client.get_info(snode.clone()).await?;
            println!("{snode}: server time {server_time_ms}ms, clock offset {}ms", ctx.accountant.clock_offset().offset_ms);
        }
        Command::ResolveOns { name } => {
            let session_id = ctx.client.resolve_ons(&name).await?;
            println!("{name} -> {session_id}");
        }
        Command::Store { data, ttl_ms } => {
            let snode = pick_snode(&ctx).await?;
            let acks = ctx
                .client
                .store(&account, Namespace::DEFAULT, data.into_bytes(), ttl_ms, snode)
                .await?;
            for (swarm_snode, ack) in acks {
                println!("{swarm_snode}: stored as {}", ack.hash);
            }
        }
        Command::Retrieve => {
            let snode = pick_snode(&ctx).await?;
            let result = ctx
                .client
                .retrieve(&account, Namespace::DEFAULT, None, snode)
                .await?;
            for message in result.messages {
                println!("{}: {} bytes", message.hash, message.ciphertext.len());
            }
        }
    }

    ctx.save_accounting_state().await?;
    Ok(())
}

fn db_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("snrr.redb")
}

async fn pick_snode(ctx: &snrr_core::CoreContext) -> eyre::Result<snrr_primitives::Snode> {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    let pool = ctx.pool.ensure_ready(now_ms).await?;
    pool.into_iter()
        .next()
        .ok_or_else(|| eyre!("snode pool is empty after bootstrap"))
}
