//! Race Winner Predictor: binary entrypoint.
//! Boots the Axum HTTP server over the JSON record store, wiring routes,
//! shared state, and the Prometheus `/metrics` endpoint.

use race_winner_predictor::{app, metrics::Metrics, EngineConfig};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
/// Filter comes from `RUST_LOG`, falling back to our own crate at info.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("race_winner_predictor=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = EngineConfig::load_default()?;
    info!(
        data_dir = %cfg.data_dir.display(),
        venue = cfg.venue_id.as_deref().unwrap_or("-"),
        form_window = cfg.form_window,
        pool_size = cfg.pool_size,
        "engine config loaded"
    );

    let mut router = app(&cfg)?;
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(error = %e, "prometheus recorder not installed; /metrics disabled"),
    }

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
