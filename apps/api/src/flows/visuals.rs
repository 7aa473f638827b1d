//! Visual flows — art-direction concepts and AI image generation.
//!
//! The image flow derives its aspect ratio from the requested post format
//! (vertical formats → portrait, feed posts → square, otherwise widescreen)
//! before dispatching to the image model.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::flows::{derive_aspect_ratio, prompts, SUPPORTED_PLATFORMS};
use crate::gemini::prompts::system_for;
use crate::gemini::{GenerativeClient, ImageRequest, ModelTier, TextRequest};
use crate::invoker::{invoke, require_filled, ContractViolation, GenerationError, OutputContract};
use crate::schema::{ValidationFailure, Validator};
use crate::template::RenderContext;

// ────────────────────────────────────────────────────────────────────────────
// Visual concept
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConceptRequest {
    pub topic: String,
    pub platform: String,
    pub post_format: String,
    pub style_preference: Option<String>,
}

impl VisualConceptRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_text("topic", &self.topic, 2, 200);
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.require_text("postFormat", &self.post_format, 2, 60);
        v.optional_text("stylePreference", self.style_preference.as_deref(), 2, 80);
        v.finish()
    }
}

/// An art-directed visual concept, including a self-contained image prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConcept {
    pub concept: String,
    pub composition: String,
    pub palette: String,
    pub image_prompt: String,
}

impl OutputContract for VisualConcept {
    fn check(&self) -> Result<(), ContractViolation> {
        require_filled("concept", &self.concept)?;
        require_filled("composition", &self.composition)?;
        require_filled("palette", &self.palette)?;
        require_filled("imagePrompt", &self.image_prompt)
    }
}

/// Generates a visual concept for a post.
pub async fn visual_concept(
    client: &dyn GenerativeClient,
    request: VisualConceptRequest,
) -> Result<VisualConcept, AppError> {
    request.validate()?;

    let ctx = RenderContext::new()
        .text("topic", request.topic.trim())
        .text("platform", request.platform.trim())
        .text("post_format", request.post_format.trim())
        .text_opt("style_preference", request.style_preference.as_deref());
    let prompt = super::render_prompt(&prompts::visual_concept_template(), &ctx)?;

    info!(platform = %request.platform, "generating visual concept");

    let concept = invoke(
        client,
        "visual_concept",
        TextRequest {
            system: system_for(prompts::VISUAL_CONCEPT_ROLE),
            prompt,
            media: None,
            tier: ModelTier::Fast,
        },
    )
    .await?;
    Ok(concept)
}

// ────────────────────────────────────────────────────────────────────────────
// Image generation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    pub prompt: String,
    pub post_format: String,
}

impl GenerateImageRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_text("prompt", &self.prompt, 5, 2000);
        v.require_text("postFormat", &self.post_format, 2, 60);
        v.finish()
    }
}

/// A generated image, base64-encoded for the JSON response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageResponse {
    pub mime_type: String,
    pub data: String,
    pub aspect_ratio: String,
}

/// Generates an image at the aspect ratio native to the post format.
pub async fn generate_image(
    client: &dyn GenerativeClient,
    request: GenerateImageRequest,
) -> Result<GeneratedImageResponse, AppError> {
    request.validate()?;
    let aspect_ratio = derive_aspect_ratio(&request.post_format);

    info!(
        post_format = %request.post_format,
        ratio = aspect_ratio.as_str(),
        "generating image"
    );

    let image = client
        .generate_image(ImageRequest {
            prompt: request.prompt.trim().to_string(),
            aspect_ratio,
        })
        .await
        .map_err(GenerationError::Client)?;

    Ok(GeneratedImageResponse {
        mime_type: image.mime_type,
        data: BASE64.encode(&image.data),
        aspect_ratio: aspect_ratio.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::gemini::testing::ScriptedClient;
    use crate::gemini::{AspectRatio, GeminiError, GeneratedImage};

    const CONCEPT_JSON: &str = r#"{
        "concept": "A dawn gym scene",
        "composition": "Low angle, subject centered",
        "palette": "Slate, amber, off-white",
        "imagePrompt": "Photorealistic dawn gym, low angle, amber light"
    }"#;

    #[tokio::test]
    async fn test_visual_concept_happy_path() {
        let client = ScriptedClient::new().push_json(CONCEPT_JSON);
        let concept = visual_concept(
            &client,
            VisualConceptRequest {
                topic: "morning workouts".to_string(),
                platform: "Instagram".to_string(),
                post_format: "Instagram Post".to_string(),
                style_preference: None,
            },
        )
        .await
        .unwrap();
        assert!(!concept.image_prompt.is_empty());
    }

    #[tokio::test]
    async fn test_concept_with_empty_field_is_rejected() {
        let client = ScriptedClient::new().push_json(
            r#"{"concept": "x", "composition": "y", "palette": "", "imagePrompt": "z"}"#,
        );
        let err = visual_concept(
            &client,
            VisualConceptRequest {
                topic: "morning workouts".to_string(),
                platform: "Instagram".to_string(),
                post_format: "Instagram Post".to_string(),
                style_preference: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Generation(GenerationError::Contract(_))
        ));
    }

    fn image_request(post_format: &str) -> GenerateImageRequest {
        GenerateImageRequest {
            prompt: "Photorealistic dawn gym scene".to_string(),
            post_format: post_format.to_string(),
        }
    }

    #[tokio::test]
    async fn test_image_flow_derives_portrait_for_reels() {
        let client = ScriptedClient::new().push_image(Ok(GeneratedImage {
            mime_type: "image/png".to_string(),
            data: Bytes::from_static(b"\x89PNG"),
        }));
        let response = generate_image(&client, image_request("Instagram Reel"))
            .await
            .unwrap();
        assert_eq!(response.aspect_ratio, "9:16");

        let requests = client.image_requests.lock().unwrap();
        assert_eq!(requests[0].aspect_ratio, AspectRatio::Portrait);
    }

    #[tokio::test]
    async fn test_image_flow_derives_square_for_feed_posts() {
        let client = ScriptedClient::new().push_image(Ok(GeneratedImage {
            mime_type: "image/png".to_string(),
            data: Bytes::from_static(b"\x89PNG"),
        }));
        let response = generate_image(&client, image_request("Facebook Post"))
            .await
            .unwrap();
        assert_eq!(response.aspect_ratio, "1:1");
    }

    #[tokio::test]
    async fn test_image_response_is_base64() {
        let client = ScriptedClient::new().push_image(Ok(GeneratedImage {
            mime_type: "image/png".to_string(),
            data: Bytes::from_static(b"\x89PNG"),
        }));
        let response = generate_image(&client, image_request("Tweet")).await.unwrap();
        assert_eq!(
            BASE64.decode(response.data.as_bytes()).unwrap(),
            b"\x89PNG"
        );
    }

    #[tokio::test]
    async fn test_empty_image_result_is_a_failure() {
        let client = ScriptedClient::new().push_image(Err(GeminiError::EmptyImage));
        let err = generate_image(&client, image_request("Tweet")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Generation(GenerationError::Client(GeminiError::EmptyImage))
        ));
    }
}
