use clap::{Parser, Subcommand};
use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::node::config::DemoConfig;
use crate::tracker::types::{Block, ChainSnapshot};
use crate::tracker::{BlockTracker, BootstrapOutcome};
use crate::utils::logging::init_logging;

/// CLI driving a tracker over a statically configured peer set.
#[derive(Parser)]
#[clap(name = "blockwatch", version)]
pub struct Cli {
    /// Path to the demo config (tracker settings, peers, batches)
    #[clap(long, default_value = "./demos/peers.toml")]
    pub config: PathBuf,

    /// Print snapshots as JSON
    #[clap(long)]
    pub json: bool,

    /// Default log filter when RUST_LOG is unset
    #[clap(long, default_value = "info")]
    pub log_level: String,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Bootstrap from the configured peers and print the adopted state
    Bootstrap,
    /// Bootstrap, then ingest the configured batches wave by wave
    Replay,
}

#[derive(Serialize)]
struct Report<'a> {
    stage: &'a str,
    #[serde(flatten)]
    snapshot: &'a ChainSnapshot,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cfg = DemoConfig::load(&cli.config)?;
    let tracker = Arc::new(BlockTracker::with_config(cfg.build_peers(), cfg.tracker.clone())?);
    info!(
        peers = %cfg.peer_names().join(","),
        threshold = tracker.threshold(),
        "tracker ready"
    );

    match tracker.bootstrap().await {
        Ok(BootstrapOutcome::Adopted { height, retained }) => {
            info!(height, retained, "bootstrapped from peers");
        }
        Ok(BootstrapOutcome::NoMajority) => info!("peers disagree, starting empty"),
        Err(e) => {
            error!("bootstrap failed: {}", e);
            return Err(e.into());
        }
    }
    print_snapshot(cli.json, "bootstrap", &tracker.snapshot())?;

    if let Cmd::Replay = cli.cmd {
        for (wave, batches) in cfg.waves() {
            let tasks = batches.into_iter().map(|b| {
                let tracker = tracker.clone();
                tokio::task::spawn_blocking(move || tracker.process_blocks(b.start, &b.blocks))
            });
            for res in join_all(tasks).await {
                res?;
            }
            print_snapshot(cli.json, &format!("wave {}", wave), &tracker.snapshot())?;
        }
    }
    Ok(())
}

fn print_snapshot(json: bool, stage: &str, snap: &ChainSnapshot) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&Report { stage, snapshot: snap })?);
    } else {
        println!("{} confirmed blocks: {}", stage, fmt_blocks(&snap.blocks));
        println!("{} confirmed height: {}", stage, snap.height);
    }
    Ok(())
}

fn fmt_blocks(blocks: &[Block]) -> String {
    let ids: Vec<&str> = blocks.iter().map(Block::as_str).collect();
    format!("[{}]", ids.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_blocks_keeps_placeholders() {
        let blocks = vec![Block::from("A"), Block::placeholder(), Block::from("C")];
        assert_eq!(fmt_blocks(&blocks), "[A  C]");
        assert_eq!(fmt_blocks(&[]), "[]");
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["blockwatch", "--json", "--config", "x.toml", "replay"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(matches!(cli.cmd, Cmd::Replay));
    }
}
