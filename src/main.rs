use std::net::SocketAddr;

use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wardlens::config::AppConfig;
use wardlens::{routes, services, AppState};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wardlens=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");
    let state = AppState::new(config)?;

    // Background refresh keeps the snapshot warm; handlers fall back to
    // an on-demand build before the first tick completes.
    tokio::spawn(services::refresh::run(state.clone()));

    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port).parse()?;
    tracing::info!(host = %addr, "Starting wardlens API server");

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
