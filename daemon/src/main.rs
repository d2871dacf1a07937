//! Clusterbot daemon — entry point for running the cluster monitor.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use clusterbot_monitor::{init_logging, LogFormat, MonitorConfig, TcpTransport};
use clusterbot_types::PeerId;

#[derive(Parser)]
#[command(name = "clusterbot", about = "Self-healing cluster peer monitor")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Discovery cycle period in milliseconds.
    #[arg(long, env = "CLUSTERBOT_FETCH_INTERVAL_MS")]
    fetch_interval_ms: Option<u64>,

    /// Retry cycle period in milliseconds.
    #[arg(long, env = "CLUSTERBOT_RECONNECT_INTERVAL_MS")]
    reconnect_interval_ms: Option<u64>,

    /// Liveness-revalidation cycle period in milliseconds.
    #[arg(long, env = "CLUSTERBOT_REFRESH_INTERVAL_MS")]
    refresh_interval_ms: Option<u64>,

    /// Location of the persisted cache snapshot.
    #[arg(long, env = "CLUSTERBOT_OUTPUT")]
    output: Option<PathBuf>,

    /// Seed peer addresses (comma-separated: "host1:4369,host2:4369").
    #[arg(long, env = "CLUSTERBOT_SEED_PEERS", value_delimiter = ',')]
    seed_peers: Vec<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "CLUSTERBOT_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "CLUSTERBOT_LOG_FORMAT")]
    log_format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MonitorConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => MonitorConfig::default(),
    };

    if let Some(v) = cli.fetch_interval_ms {
        config.fetch_interval_ms = v;
    }
    if let Some(v) = cli.reconnect_interval_ms {
        config.reconnect_interval_ms = v;
    }
    if let Some(v) = cli.refresh_interval_ms {
        config.refresh_interval_ms = v;
    }
    if let Some(v) = cli.output {
        config.output = v;
    }
    if !cli.seed_peers.is_empty() {
        config.seed_peers = cli.seed_peers;
    }
    config.log_level = cli.log_level;
    config.log_format = cli.log_format;

    let format = config
        .log_format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Human);
    init_logging(format, &config.log_level);

    let seeds: Vec<PeerId> = config
        .seed_peers
        .iter()
        .map(|s| s.parse())
        .collect::<Result<_, _>>()
        .context("invalid seed peer address")?;

    tracing::info!(
        fetch_ms = config.fetch_interval_ms,
        reconnect_ms = config.reconnect_interval_ms,
        refresh_ms = config.refresh_interval_ms,
        output = %config.output.display(),
        seeds = seeds.len(),
        "starting cluster monitor"
    );

    let transport = Arc::new(TcpTransport::new(seeds));
    let mut handle = clusterbot_monitor::spawn(config, transport)?;

    handle.shutdown_controller().wait_for_signal().await;
    handle.stop().await;

    tracing::info!("clusterbot exited cleanly");
    Ok(())
}
