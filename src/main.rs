use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use payload_tracker_api::{
    app,
    broker::StorageBrokerClient,
    config,
    storage::{DatabaseManager, PgPayloadStore},
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "payload-tracker-api", version, about = "Payload lifecycle status API")]
struct Args {
    /// Port to listen on (defaults to the configured API port)
    #[arg(long, env = "PAYLOAD_TRACKER_API_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "PAYLOAD_TRACKER_API_BIND", default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, STORAGE_BROKER_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting payload tracker API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let broker = StorageBrokerClient::new(&config.storage_broker)
        .context("failed to build storage broker client")?;
    let store = Arc::new(PgPayloadStore::new(pool.clone()));

    let state = AppState::new(store, broker, config).context("failed to register metrics")?;
    let router = app(state, config);

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("{}:{}", args.bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Payload tracker API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(&pool).await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
