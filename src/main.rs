// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::clock::{Clock, SystemClock};
use crate::application::dashboard_service::DashboardService;
use crate::application::insight_service::InsightService;
use crate::application::metrics_service::MetricsService;
use crate::infrastructure::anthropic_client::AnthropicClient;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::eia_client::EiaClient;
use crate::infrastructure::fred_client::FredClient;
use crate::infrastructure::weather_client::WeatherClient;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    for var in config.credentials.missing() {
        tracing::warn!("{} is not set; that source will serve fallback values", var);
    }

    // Create upstream clients (infrastructure layer)
    let credentials = config.credentials.clone();
    let economic_api = Arc::new(FredClient::new(&config.economic, credentials.fred_api_key)?);
    let energy_api = Arc::new(EiaClient::new(&config.energy, credentials.eia_api_key)?);
    let weather_api = Arc::new(WeatherClient::new(&config.weather, credentials.openweather_api_key)?);
    let text_api = Arc::new(AnthropicClient::new(&config.insight, credentials.anthropic_api_key)?);

    // Create services (application layer)
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics = MetricsService::new(
        economic_api,
        energy_api,
        weather_api,
        config.cache.clone(),
        clock.clone(),
    );
    let insights = InsightService::new(text_api, config.cache.insight_ttl(), clock.clone());
    let dashboard_service = DashboardService::new(Arc::new(metrics), Arc::new(insights), clock);

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    let router = router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting regional-pulse service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
