pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::flows::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Trends
        .route(
            "/api/v1/trends/forecast",
            post(handlers::handle_trend_forecast),
        )
        .route("/api/v1/trends/top", post(handlers::handle_top_trends))
        .route(
            "/api/v1/trends/reasoning",
            post(handlers::handle_trend_reasoning),
        )
        .route("/api/v1/trends/detail", post(handlers::handle_trend_detail))
        // Content generation
        .route("/api/v1/captions", post(handlers::handle_captions))
        .route("/api/v1/bios", post(handlers::handle_bios))
        .route("/api/v1/pov", post(handlers::handle_pov))
        .route("/api/v1/analysis", post(handlers::handle_post_analysis))
        .route("/api/v1/repurpose", post(handlers::handle_repurpose))
        // Visuals
        .route(
            "/api/v1/visuals/concept",
            post(handlers::handle_visual_concept),
        )
        .route(
            "/api/v1/visuals/image",
            post(handlers::handle_generate_image),
        )
        .with_state(state)
}
