//! Deskfolio server - portfolio project catalog over HTTP

use clap::Parser;
use deskfolio_core::config::Config;
use deskfolio_server::{build_router, AppState};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "deskfolio")]
#[command(author, version, about = "Portfolio project catalog server", long_about = None)]
struct Cli {
    /// Config file path (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address override, e.g. 0.0.0.0:8080
    #[arg(short, long)]
    listen: Option<String>,

    /// Quiet mode (no startup banner)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("deskfolio=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    config.validate()?;
    let addr = config.listen_addr()?;

    let state = AppState::from_config(&config).await?;
    info!(
        listen = %addr,
        catalog = state.service.catalog_backend(),
        assets = state.service.asset_backend(),
        "Starting deskfolio"
    );
    if !cli.quiet {
        println!(
            "deskfolio listening on http://{} (catalog: {}, assets: {})",
            addr,
            state.service.catalog_backend(),
            state.service.asset_backend()
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
