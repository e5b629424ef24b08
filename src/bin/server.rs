//! grantmatrix REST API server
//!
//! Run with: cargo run --features server --bin grantmatrix-server -- --config grantmatrix.toml
//!
//! The `[seed]` section of the config file is provisioned on every start
//! (idempotent upsert), then the HTTP surface in `grantmatrix::server` is served.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use grantmatrix::{server, Loader, Store};

#[derive(Parser)]
#[command(name = "grantmatrix-server")]
#[command(about = "Role and per-user permission matrix server")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(short, long, env = "GRANTMATRIX_CONFIG")]
    config: Option<PathBuf>,

    /// Listen host (overrides config and GRANTMATRIX_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config and GRANTMATRIX_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// LMDB directory (overrides config and GRANTMATRIX_DB_PATH)
    #[arg(short, long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> grantmatrix::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Loader::default().load(
        cli.config.as_deref(),
        cli.host.as_deref(),
        cli.port,
        cli.db_path.as_deref(),
    )?;

    let store = Store::open_config(&config.storage)?;
    tracing::info!(path = %config.storage.path.display(), "database initialized");
    if !config.seed.is_empty() {
        store.provision(&config.seed)?;
    }

    server::serve(&config, store).await
}
