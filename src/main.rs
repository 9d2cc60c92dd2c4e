use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vidtube_api::config::config;
use vidtube_api::database::DatabaseManager;
use vidtube_api::media::cloudinary::CloudinaryStore;
use vidtube_api::{app, AppState};

/// VidTube API server
#[derive(Parser, Debug)]
#[command(name = "vidtube-api", version, about)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Do not create missing tables at startup
    #[arg(long)]
    skip_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, secrets, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vidtube_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    tracing::info!("Starting VidTube API in {:?} mode", config.environment);
    tracing::info!("Database: {}", config.redacted_database_url());

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let media = CloudinaryStore::new(config.media.clone())?;

    if args.skip_schema {
        tracing::info!("Skipping schema bootstrap");
    } else if let Err(e) = DatabaseManager::ensure_schema(&pool).await {
        tracing::warn!("Schema bootstrap failed, continuing without it: {}", e);
    }

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(pool, config, Arc::new(media));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("VidTube API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
