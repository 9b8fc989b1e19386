use dashboard_gateway::{app, config, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up BACKEND_URL, PAGES_UPSTREAM_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting dashboard gateway in {:?} mode", config.environment);
    tracing::info!("Session oracle: {}{}", config.backend.base_url, config.backend.session_path);

    if config.fallback.enabled {
        tracing::warn!(
            "Cookie fallback is enabled: during a backend outage, presence of any of {:?} admits protected pages",
            config.fallback.cookie_names
        );
        if dashboard_gateway::is_production!() {
            tracing::warn!("Cookie fallback is active in production; set GATE_FALLBACK_ENABLED=false to disable");
        }
    }

    let bind_addr = config.bind_addr();
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Dashboard gateway listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
