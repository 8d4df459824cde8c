mod config;
mod models;
mod routes;
mod services;
mod utils;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::maccms::MaccmsClient;
use crate::services::registry::SourceRegistry;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub registry: SourceRegistry,
    pub catalog: MaccmsClient,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vodhub_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting VodHub Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);

    // Load the source registry
    let registry = SourceRegistry::load(&config.sources_file)?;
    tracing::info!(
        "Loaded {} sources from {}",
        registry.len(),
        config.sources_file
    );

    // Shared upstream catalog client
    let catalog = MaccmsClient::new(
        &config.user_agent,
        config.listing_timeout_ms,
        config.detail_timeout_ms,
    );

    // Build application state
    let state = Arc::new(AppState {
        config,
        registry,
        catalog,
        start_time: Instant::now(),
    });

    // Build router
    let app = Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/ready", get(routes::health::ready))
        .route("/live", get(routes::health::live))
        // Catalog endpoints
        .route("/api/sources", get(routes::catalog::list_sources))
        .route("/api/search", get(routes::catalog::search))
        .route("/api/detail", get(routes::catalog::detail))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
