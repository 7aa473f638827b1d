mod config;
mod errors;
mod flows;
mod gemini;
mod invoker;
mod media;
mod routes;
mod schema;
mod state;
mod template;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Trendcast API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the generative-model client — the single shared dependency
    let client = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    info!(
        "Gemini client initialized (text: {}/{}, image: {})",
        gemini::TEXT_MODEL_FAST,
        gemini::TEXT_MODEL_QUALITY,
        gemini::IMAGE_MODEL
    );

    // Build app state
    let state = AppState {
        client,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
