//! Elidune Circulation Server
//!
//! REST front for the in-memory circulation core.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elidune_circulation::{api, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("elidune_circulation={},tower_http=debug", config.logging.level).into()
    });
    let json = config.logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting Elidune Circulation v{}", env!("CARGO_PKG_VERSION"));
    match config.circulation.borrow_wait_timeout_secs {
        Some(secs) => tracing::info!("Borrow waits are bounded to {}s", secs),
        None => tracing::info!("Borrow waits are unbounded"),
    }

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Build router over fresh shared state
    let app = api::router(AppState::new(config));

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
