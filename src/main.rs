use anyhow::Context;
use clap::Parser;
use federated_library::config::types::FederationConfig;
use federated_library::node::LibraryNode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// One institution of the library federation.
#[derive(Debug, Parser)]
#[command(name = "federated-library", version, about)]
struct Args {
    /// Path to the federation TOML file.
    #[arg(long)]
    config: PathBuf,

    /// Institution this process serves; must be listed in `libraries`.
    #[arg(long)]
    institution: String,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = FederationConfig::load(&args.config)
        .with_context(|| format!("invalid configuration {}", args.config.display()))?;

    tracing::info!(
        "Starting {} (federation: {})",
        args.institution,
        config.libraries().join(", ")
    );

    LibraryNode::start(&config, &args.institution).await
}
