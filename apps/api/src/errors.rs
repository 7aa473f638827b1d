use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::invoker::{CompositeFailure, GenerationError};
use crate::schema::ValidationFailure;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Composite generation error: {0}")]
    Composite(#[from] CompositeFailure),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Validation failures name every offending field; the model was
            // never invoked, so resubmitting with fixed input is safe.
            AppError::Validation(failure) => {
                let body = Json(json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": "One or more fields failed validation",
                        "fields": failure.errors,
                    }
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            // Generation detail is logged, never leaked; the user sees a
            // generic retryable message.
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                generation_failed_response()
            }
            AppError::Composite(e) => {
                tracing::error!("Composite generation error: {e}");
                generation_failed_response()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                let body = Json(json!({
                    "error": {
                        "code": "INTERNAL_ERROR",
                        "message": "An internal server error occurred",
                    }
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

fn generation_failed_response() -> Response {
    let body = Json(json!({
        "error": {
            "code": "GENERATION_FAILED",
            "message": "Could not generate content. Please try again.",
        }
    }));
    (StatusCode::BAD_GATEWAY, body).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;
    use crate::gemini::GeminiError;
    use crate::schema::Validator;

    #[test]
    fn test_validation_error_maps_to_400() {
        let mut v = Validator::new();
        v.require_text("niche", "", 2, 80);
        let err = AppError::from(v.finish().unwrap_err());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_generation_error_maps_to_502() {
        let err = AppError::Generation(GenerationError::Client(GeminiError::EmptyText));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_composite_error_maps_to_502() {
        let err = AppError::Composite(CompositeFailure::First {
            label: "trend_reasoning",
            source: GenerationError::Client(GeminiError::EmptyResponse),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_error_maps_to_500() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
