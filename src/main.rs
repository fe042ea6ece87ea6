// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::enrichment_service::EnrichmentService;
use crate::application::measurement_repository::MeasurementRepository;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::backend_repository::BackendRepository;
use crate::infrastructure::config::{load_backend_config, load_dashboard_config};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    classify_network_type, get_dashboard, health_check, resolve_channel, stream_dashboard,
    submit_observation, submit_test,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let backend_config = load_backend_config().context("Failed to load config/backend")?;
    let dashboard_config = load_dashboard_config().context("Failed to load config/dashboard")?;

    // Create repository (infrastructure layer)
    let repository: Arc<dyn MeasurementRepository> = Arc::new(BackendRepository::new(
        backend_config.backend.host,
        backend_config.backend.token,
        Duration::from_secs(backend_config.backend.timeout_secs),
    )?);

    // Create services (application layer)
    let dashboard_service = DashboardService::new(repository.clone(), dashboard_config.clone());
    let streaming_service = StreamingDashboardService::new(repository.clone(), dashboard_config);
    let enrichment_service = EnrichmentService::new(repository);

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        streaming_service,
        enrichment_service,
    });

    // Build router (presentation layer)
    // Responses are compressed by the handlers themselves, so no CompressionLayer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboards/:phone", get(get_dashboard))
        .route("/dashboards/:phone/stream", get(stream_dashboard))
        .route("/channels/:rat/:channel", get(resolve_channel))
        .route("/network-types/:code", get(classify_network_type))
        .route("/observations", post(submit_observation))
        .route("/tests", post(submit_test))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = backend_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", backend_config.server.bind))?;
    tracing::info!("Starting cell-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
