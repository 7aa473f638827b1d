//! Caption flow — writes 8 captions for an uploaded image or video.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::flows::{prompts, SUPPORTED_PLATFORMS};
use crate::gemini::prompts::system_for;
use crate::gemini::{GenerativeClient, ModelTier, TextRequest};
use crate::invoker::{invoke, require_exact, require_filled, ContractViolation, OutputContract};
use crate::media::{parse_data_uri, MediaPayload};
use crate::schema::{ValidationFailure, Validator};
use crate::template::RenderContext;

/// Request body for caption generation. `media` is a
/// `data:<mime>;base64,...` URI produced by the upload form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    pub media: String,
    pub platform: String,
    pub niche: Option<String>,
    pub user_input: Option<String>,
    #[serde(default)]
    pub include_emojis: bool,
}

impl CaptionRequest {
    /// Validates the request and decodes the media payload in one pass —
    /// the payload is needed downstream, so it is parsed exactly once.
    pub fn validate(&self) -> Result<MediaPayload, ValidationFailure> {
        let mut v = Validator::new();
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.optional_text("niche", self.niche.as_deref(), 2, 80);
        v.optional_text("userInput", self.user_input.as_deref(), 2, 500);

        let media = match parse_data_uri(&self.media) {
            Ok(payload) => Some(payload),
            Err(e) => {
                v.push("media", e.to_string());
                None
            }
        };

        v.finish()?;
        Ok(media.expect("media is Some when validation passed"))
    }
}

/// One generated caption with its style label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub style: String,
}

/// The caption set: exactly 8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSet {
    pub captions: Vec<Caption>,
}

impl OutputContract for CaptionSet {
    fn check(&self) -> Result<(), ContractViolation> {
        require_exact("captions", self.captions.len(), 8)?;
        for caption in &self.captions {
            require_filled("captions.text", &caption.text)?;
            require_filled("captions.style", &caption.style)?;
        }
        Ok(())
    }
}

/// Generates 8 captions for the uploaded media.
pub async fn generate_captions(
    client: &dyn GenerativeClient,
    request: CaptionRequest,
) -> Result<CaptionSet, AppError> {
    let media = request.validate()?;

    let ctx = RenderContext::new()
        .text("platform", request.platform.trim())
        .text_opt("niche", request.niche.as_deref())
        .text_opt("user_input", request.user_input.as_deref())
        .flag("include_emojis", request.include_emojis);
    let prompt = super::render_prompt(&prompts::caption_template(), &ctx)?;

    info!(
        platform = %request.platform,
        mime = %media.mime_type,
        "generating captions"
    );

    let captions = invoke(
        client,
        "captions",
        TextRequest {
            system: system_for(prompts::CAPTION_ROLE),
            prompt,
            media: Some(media),
            tier: ModelTier::Fast,
        },
    )
    .await?;
    Ok(captions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::ScriptedClient;
    use crate::invoker::GenerationError;

    const TINY_PNG_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn request() -> CaptionRequest {
        CaptionRequest {
            media: TINY_PNG_URI.to_string(),
            platform: "Instagram".to_string(),
            niche: Some("fitness".to_string()),
            user_input: None,
            include_emojis: true,
        }
    }

    fn captions_json(count: usize) -> String {
        let captions: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"text": "Caption {i}", "style": "style{i}"}}"#))
            .collect();
        format!(r#"{{"captions": [{}]}}"#, captions.join(","))
    }

    #[tokio::test]
    async fn test_returns_exactly_8_captions() {
        let client = ScriptedClient::new().push_json(&captions_json(8));
        let set = generate_captions(&client, request()).await.unwrap();
        assert_eq!(set.captions.len(), 8);
    }

    #[tokio::test]
    async fn test_rejects_wrong_caption_count() {
        for count in [7, 9] {
            let client = ScriptedClient::new().push_json(&captions_json(count));
            let err = generate_captions(&client, request()).await.unwrap_err();
            assert!(matches!(
                err,
                AppError::Generation(GenerationError::Contract(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_media_payload_travels_with_the_prompt() {
        let client = ScriptedClient::new().push_json(&captions_json(8));
        generate_captions(&client, request()).await.unwrap();

        let requests = client.text_requests.lock().unwrap();
        let media = requests[0].media.as_ref().unwrap();
        assert_eq!(media.mime_type, "image/png");
        assert!(!media.data.is_empty());
    }

    #[tokio::test]
    async fn test_bad_media_uri_fails_validation_before_model_call() {
        let client = ScriptedClient::new();
        let bad = CaptionRequest {
            media: "https://example.com/cat.png".to_string(),
            ..request()
        };
        let err = generate_captions(&client, bad).await.unwrap_err();
        match err {
            AppError::Validation(failure) => {
                assert!(failure.errors.iter().any(|e| e.field == "media"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(client.text_requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = format!(
            r#"{{"media": "{TINY_PNG_URI}", "platform": "Instagram"}}"#
        );
        let request: CaptionRequest = serde_json::from_str(&json).unwrap();
        assert!(!request.include_emojis);
        assert!(request.niche.is_none());
    }
}
