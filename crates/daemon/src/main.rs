// marginalia: review a text file in the browser and leave line comments.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use marginalia_daemon::config::{Config, ConfigOverrides};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marginalia", version, about = "Line-anchored review comments for a local file")]
struct Cli {
    /// File to review
    file: PathBuf,
    /// Port to listen on (0 picks a free port)
    #[arg(short, long)]
    port: Option<u16>,
    /// Directory for the sidecar and review file
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Interface to bind
    #[arg(long)]
    host: Option<String>,
    /// Milliseconds of quiet before comments are saved
    #[arg(long)]
    debounce_ms: Option<u64>,
    /// Don't watch the source file for external edits
    #[arg(long)]
    no_watch: bool,
    /// Config file to use instead of ~/.marginalia/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;
    let config = loaded.with_overrides(ConfigOverrides {
        host: cli.host,
        port: cli.port,
        debounce_ms: cli.debounce_ms,
        no_watch: cli.no_watch,
        output_dir: cli.output,
    });

    info!(file = %cli.file.display(), "starting review");
    marginalia_daemon::runtime::run(&cli.file, config)
        .await
        .context("review server terminated unexpectedly")
}
