use anyhow::Context;
use clap::Parser;
use emotrack_adaptor_web::{build_router, serve, AppState};
use emotrack_core::utils::logger::init_logging;
use emotrack_core::{load_env, load_env_from_path, EmotionStore, ServiceConfig};
use emotrack_storage_sql::SqliteAdapter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "emotrack-server", about = "Emotion tracking ingest and dashboard API")]
struct Cli {
    /// Environment file loaded before reading configuration
    #[arg(long)]
    env_file: Option<PathBuf>,

    #[arg(long, env = "EMOTRACK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Overrides EMOTRACK_DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    /// Overrides EMOTRACK_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    std::env::set_var("EMOTRACK_LOG_LEVEL", &cli.log_level);
    init_logging();

    match &cli.env_file {
        Some(path) => load_env_from_path(path)?,
        None => load_env()?,
    }

    let mut config = ServiceConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;

    let adapter = SqliteAdapter::with_max_connections(&config.database_url, config.max_connections)
        .await
        .context("opening database")?;
    adapter.initialize().await.context("initializing schema")?;

    let directory = config.device_directory();
    info!(
        "Serving {} named device(s), default device {}",
        directory.len(),
        config.default_device_id
    );

    let store: Arc<dyn EmotionStore> = Arc::new(adapter.clone());
    let state = AppState::new(store, Arc::new(directory), config.default_device_id.clone());
    let router = build_router(state, &config.cors_origins);

    serve(&config.bind_addr(), router)
        .await
        .with_context(|| format!("serving on {}", config.bind_addr()))?;

    adapter.close().await;
    info!("Emotrack server stopped");
    Ok(())
}
