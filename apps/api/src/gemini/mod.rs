//! Gemini client — the single point of entry for all generative-model calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! All model interactions MUST go through this module, via the
//! [`GenerativeClient`] trait carried in `AppState`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::media::MediaPayload;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Text models. Hardcoded to prevent accidental drift between capabilities.
pub const TEXT_MODEL_FAST: &str = "gemini-2.5-flash";
pub const TEXT_MODEL_QUALITY: &str = "gemini-2.5-pro";
/// Image model, driven through the same generateContent surface.
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const MAX_OUTPUT_TOKENS: u32 = 8192;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Backend selection for a text call: `Fast` for interactive flows,
/// `Quality` for long structured outputs (trend forecasts, analyses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelTier {
    #[default]
    Fast,
    Quality,
}

impl ModelTier {
    pub fn model(&self) -> &'static str {
        match self {
            ModelTier::Fast => TEXT_MODEL_FAST,
            ModelTier::Quality => TEXT_MODEL_QUALITY,
        }
    }
}

/// Target shape of a generated image. The wire strings are the only
/// ratios the image model accepts for this app's formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Portrait,
    Square,
    Widescreen,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
        }
    }
}

/// One text-generation call: instructions plus optional attached media.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub system: String,
    pub prompt: String,
    pub media: Option<MediaPayload>,
    pub tier: ModelTier,
}

/// One image-generation call.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

/// A generated image as returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Bytes,
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("model returned no candidates")]
    EmptyResponse,

    #[error("model returned no text content")]
    EmptyText,

    #[error("model returned no image data")]
    EmptyImage,

    #[error("model returned an image that was not valid base64")]
    ImageDecode,
}

/// The model-call seam every flow depends on. `AppState` carries an
/// `Arc<dyn GenerativeClient>`; tests substitute a scripted double.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Submits a rendered prompt and returns the raw model text.
    async fn generate_text(&self, request: TextRequest) -> Result<String, GeminiError>;

    /// Submits an image prompt and returns the decoded image bytes.
    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GeminiError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireInlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    text: Option<String>,
    inline_data: Option<CandidateInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The production Gemini client. Retries on 429 and 5xx with exponential
/// backoff; all other failures surface immediately.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn call(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = format!("{GEMINI_API_BASE}/{model}:generateContent");
        let mut last_error: Option<GeminiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GeminiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(GeminiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(GeminiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateContentResponse =
                response.json().await.map_err(GeminiError::Http)?;
            return Ok(parsed);
        }

        Err(last_error.unwrap_or(GeminiError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_text(&self, request: TextRequest) -> Result<String, GeminiError> {
        let mut parts = Vec::new();
        if let Some(media) = &request.media {
            parts.push(WirePart {
                text: None,
                inline_data: Some(WireInlineData {
                    mime_type: media.mime_type.clone(),
                    data: BASE64.encode(&media.data),
                }),
            });
        }
        parts.push(WirePart {
            text: Some(request.prompt),
            inline_data: None,
        });

        let body = GenerateContentRequest {
            contents: vec![WireContent { parts }],
            system_instruction: Some(WireContent {
                parts: vec![WirePart {
                    text: Some(request.system),
                    inline_data: None,
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json"),
                max_output_tokens: Some(MAX_OUTPUT_TOKENS),
                response_modalities: None,
                image_config: None,
            }),
        };

        let response = self.call(request.tier.model(), &body).await?;
        let text = first_text(&response).ok_or(GeminiError::EmptyText)?;

        debug!(
            model = request.tier.model(),
            chars = text.len(),
            "Gemini text call succeeded"
        );
        Ok(text)
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GeminiError> {
        let body = GenerateContentRequest {
            contents: vec![WireContent {
                parts: vec![WirePart {
                    text: Some(request.prompt),
                    inline_data: None,
                }],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                max_output_tokens: None,
                response_modalities: Some(vec!["IMAGE"]),
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio.as_str(),
                }),
            }),
        };

        let response = self.call(IMAGE_MODEL, &body).await?;
        let inline = first_inline_data(&response).ok_or(GeminiError::EmptyImage)?;

        let data = BASE64
            .decode(inline.data.as_bytes())
            .map_err(|_| GeminiError::ImageDecode)?;
        if data.is_empty() {
            return Err(GeminiError::EmptyImage);
        }

        debug!(
            mime = %inline.mime_type,
            bytes = data.len(),
            "Gemini image call succeeded"
        );
        Ok(GeneratedImage {
            mime_type: inline.mime_type.clone(),
            data: Bytes::from(data),
        })
    }
}

/// Extracts the first text part from the first candidate.
fn first_text(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .find_map(|p| p.text.clone())
}

/// Extracts the first inline-data part from the first candidate.
fn first_inline_data(response: &GenerateContentResponse) -> Option<&CandidateInlineData> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .find_map(|p| p.inline_data.as_ref())
}

// ────────────────────────────────────────────────────────────────────────────
// Test double
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// A scripted [`GenerativeClient`]: responses are queued up front and
    /// popped per call; every request is recorded for assertions.
    #[derive(Default)]
    pub struct ScriptedClient {
        text_responses: Mutex<VecDeque<Result<String, GeminiError>>>,
        image_responses: Mutex<VecDeque<Result<GeneratedImage, GeminiError>>>,
        pub text_requests: Mutex<Vec<TextRequest>>,
        pub image_requests: Mutex<Vec<ImageRequest>>,
    }

    impl ScriptedClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_text(self, response: Result<String, GeminiError>) -> Self {
            self.text_responses.lock().unwrap().push_back(response);
            self
        }

        pub fn push_json(self, json: &str) -> Self {
            self.push_text(Ok(json.to_string()))
        }

        pub fn push_image(self, response: Result<GeneratedImage, GeminiError>) -> Self {
            self.image_responses.lock().unwrap().push_back(response);
            self
        }
    }

    #[async_trait]
    impl GenerativeClient for ScriptedClient {
        async fn generate_text(&self, request: TextRequest) -> Result<String, GeminiError> {
            self.text_requests.lock().unwrap().push(request);
            self.text_responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("ScriptedClient ran out of scripted text responses")
        }

        async fn generate_image(
            &self,
            request: ImageRequest,
        ) -> Result<GeneratedImage, GeminiError> {
            self.image_requests.lock().unwrap().push(request);
            self.image_responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("ScriptedClient ran out of scripted image responses")
        }
    }
}
