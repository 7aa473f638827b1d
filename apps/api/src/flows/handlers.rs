//! Axum route handlers for the generation flows.
//!
//! Handlers stay thin: extract the JSON body, hand it to the flow with the
//! shared client, and return the typed result. Validation lives in the flows
//! so the services are exercisable without HTTP.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::flows::analysis::{analyse_post, PostAnalysisRequest, ViralityAnalysis};
use crate::flows::bios::{generate_bios, BioRequest, BioSet};
use crate::flows::captions::{generate_captions, CaptionRequest, CaptionSet};
use crate::flows::pov::{generate_pov, PovRequest, PovSet};
use crate::flows::repurpose::{repurpose_url, RepurposeRequest};
use crate::flows::trends::{
    forecast_trends, top_trends, trend_detail, trend_reasoning, TopTrends, TopTrendsRequest,
    TrendDetail, TrendDetailRequest, TrendForecast, TrendForecastRequest, TrendReasoning,
    TrendReasoningRequest,
};
use crate::flows::visuals::{
    generate_image, visual_concept, GenerateImageRequest, GeneratedImageResponse,
    VisualConcept, VisualConceptRequest,
};
use crate::flows::PostPlan;
use crate::state::AppState;

/// POST /api/v1/trends/forecast
pub async fn handle_trend_forecast(
    State(state): State<AppState>,
    Json(request): Json<TrendForecastRequest>,
) -> Result<Json<TrendForecast>, AppError> {
    Ok(Json(forecast_trends(state.client.as_ref(), request).await?))
}

/// POST /api/v1/trends/top
pub async fn handle_top_trends(
    State(state): State<AppState>,
    Json(request): Json<TopTrendsRequest>,
) -> Result<Json<TopTrends>, AppError> {
    Ok(Json(top_trends(state.client.as_ref(), request).await?))
}

/// POST /api/v1/trends/reasoning
pub async fn handle_trend_reasoning(
    State(state): State<AppState>,
    Json(request): Json<TrendReasoningRequest>,
) -> Result<Json<TrendReasoning>, AppError> {
    Ok(Json(trend_reasoning(state.client.as_ref(), request).await?))
}

/// POST /api/v1/trends/detail
///
/// Composite: fetches reasoning and a post plan concurrently and merges
/// them; fails all-or-nothing if either sub-generation fails.
pub async fn handle_trend_detail(
    State(state): State<AppState>,
    Json(request): Json<TrendDetailRequest>,
) -> Result<Json<TrendDetail>, AppError> {
    Ok(Json(trend_detail(state.client.as_ref(), request).await?))
}

/// POST /api/v1/captions
pub async fn handle_captions(
    State(state): State<AppState>,
    Json(request): Json<CaptionRequest>,
) -> Result<Json<CaptionSet>, AppError> {
    Ok(Json(generate_captions(state.client.as_ref(), request).await?))
}

/// POST /api/v1/bios
pub async fn handle_bios(
    State(state): State<AppState>,
    Json(request): Json<BioRequest>,
) -> Result<Json<BioSet>, AppError> {
    Ok(Json(generate_bios(state.client.as_ref(), request).await?))
}

/// POST /api/v1/pov
pub async fn handle_pov(
    State(state): State<AppState>,
    Json(request): Json<PovRequest>,
) -> Result<Json<PovSet>, AppError> {
    Ok(Json(generate_pov(state.client.as_ref(), request).await?))
}

/// POST /api/v1/analysis
pub async fn handle_post_analysis(
    State(state): State<AppState>,
    Json(request): Json<PostAnalysisRequest>,
) -> Result<Json<ViralityAnalysis>, AppError> {
    Ok(Json(analyse_post(state.client.as_ref(), request).await?))
}

/// POST /api/v1/repurpose
pub async fn handle_repurpose(
    State(state): State<AppState>,
    Json(request): Json<RepurposeRequest>,
) -> Result<Json<PostPlan>, AppError> {
    Ok(Json(repurpose_url(state.client.as_ref(), request).await?))
}

/// POST /api/v1/visuals/concept
pub async fn handle_visual_concept(
    State(state): State<AppState>,
    Json(request): Json<VisualConceptRequest>,
) -> Result<Json<VisualConcept>, AppError> {
    Ok(Json(visual_concept(state.client.as_ref(), request).await?))
}

/// POST /api/v1/visuals/image
pub async fn handle_generate_image(
    State(state): State<AppState>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<GeneratedImageResponse>, AppError> {
    Ok(Json(generate_image(state.client.as_ref(), request).await?))
}
