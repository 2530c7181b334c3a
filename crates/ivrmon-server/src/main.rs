use anyhow::Result;
use chrono::Utc;
use ivrmon_server::app;
use ivrmon_server::config::ServerConfig;
use ivrmon_server::state::AppState;
use ivrmon_storage::store::SqliteIvrStore;
use ivrmon_telephony::exotel::ExotelClient;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ivrmon=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match args.get(1) {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env_overrides();

    // Without the store nothing can be served, so this failure is fatal.
    let store = Arc::new(SqliteIvrStore::new(Path::new(&config.db_path))?);

    let telephony = if config.exotel.is_configured() {
        match ExotelClient::new(config.exotel.clone()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "Telephony client unavailable, reports fall back to sample data");
                None
            }
        }
    } else {
        tracing::info!("Telephony API not configured, reports fall back to sample data");
        None
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port).parse()?;
    let state = AppState {
        store,
        telephony,
        config: Arc::new(config),
        start_time: Utc::now(),
    };

    let app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(http = %addr, "Webhook receiver started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
