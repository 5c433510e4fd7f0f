use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use foliogit_config::SiteConfig;
use foliogit_server::{create_router, AppState};
use foliogit_store::store_for;

#[derive(Parser, Debug)]
#[command(name = "foliogit-server", about = "Admin backend for a portfolio site")]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "foliogit.toml")]
    config: PathBuf,

    /// Override the listening port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foliogit_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = SiteConfig::load_from(&args.config)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    tracing::info!(
        "Environment: {:?}, binding {}",
        config.environment,
        config.bind_addr()
    );

    // Select the persistence backend for this environment
    let store = store_for(&config)?;

    // Missing auth secrets are fatal here, before the listener opens
    let bind_addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, store)?);

    let app = create_router(Arc::clone(&state));

    tracing::info!("FolioGit admin server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to stop");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
