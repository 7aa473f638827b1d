//! Repurpose flow — turns the content behind a URL into a native post plan.
//!
//! Reuses the exact post-plan output shape of the trend flows, so a
//! repurposed article and a trend-derived plan render identically downstream.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::flows::{prompts, PostPlan, SUPPORTED_PLATFORMS, USER_TYPES};
use crate::gemini::prompts::system_for;
use crate::gemini::{GenerativeClient, ModelTier, TextRequest};
use crate::invoker::invoke;
use crate::schema::{ValidationFailure, Validator};
use crate::template::RenderContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepurposeRequest {
    pub url: String,
    pub platform: String,
    pub user_type: String,
}

impl RepurposeRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_url("url", &self.url);
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.require_member("userType", &self.user_type, USER_TYPES);
        v.finish()
    }
}

/// Repurposes the linked content into a post plan for the target platform.
pub async fn repurpose_url(
    client: &dyn GenerativeClient,
    request: RepurposeRequest,
) -> Result<PostPlan, AppError> {
    request.validate()?;

    let ctx = RenderContext::new()
        .text("url", request.url.trim())
        .text("platform", request.platform.trim())
        .text("user_type", request.user_type.trim());
    let prompt = super::render_prompt(&prompts::repurpose_template(), &ctx)?;

    info!(platform = %request.platform, "repurposing URL");

    let plan = invoke(
        client,
        "repurpose",
        TextRequest {
            system: system_for(prompts::REPURPOSE_ROLE),
            prompt,
            media: None,
            tier: ModelTier::Fast,
        },
    )
    .await?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::ScriptedClient;
    use crate::invoker::GenerationError;

    const PLAN_JSON: &str = r##"{
        "hook": "You are pricing your work wrong",
        "caption": "Three takeaways from the article",
        "hashtags": ["#freelance", "#pricing", "#business"],
        "emojiCombo": "💸📈",
        "suggestedPostFormat": "LinkedIn Article"
    }"##;

    fn request() -> RepurposeRequest {
        RepurposeRequest {
            url: "https://example.com/blog/pricing".to_string(),
            platform: "LinkedIn".to_string(),
            user_type: "Brand".to_string(),
        }
    }

    #[tokio::test]
    async fn test_repurpose_returns_a_post_plan() {
        let client = ScriptedClient::new().push_json(PLAN_JSON);
        let plan = repurpose_url(&client, request()).await.unwrap();
        assert_eq!(plan.hook, "You are pricing your work wrong");
        assert_eq!(plan.hashtags.len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_model_call() {
        let client = ScriptedClient::new();
        let bad = RepurposeRequest {
            url: "not a url".to_string(),
            ..request()
        };
        let err = repurpose_url(&client, bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(client.text_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plan_with_empty_hook_is_rejected() {
        let client = ScriptedClient::new().push_json(
            r##"{"hook": "", "caption": "c", "hashtags": ["#a"], "emojiCombo": "x", "suggestedPostFormat": "Tweet"}"##,
        );
        let err = repurpose_url(&client, request()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Generation(GenerationError::Contract(_))
        ));
    }

    #[tokio::test]
    async fn test_prompt_names_the_url_and_platform() {
        let client = ScriptedClient::new().push_json(PLAN_JSON);
        repurpose_url(&client, request()).await.unwrap();
        let requests = client.text_requests.lock().unwrap();
        assert!(requests[0].prompt.contains("https://example.com/blog/pricing"));
        assert!(requests[0].prompt.contains("LinkedIn"));
    }
}
