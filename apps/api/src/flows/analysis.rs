//! Post-analysis flow — audits an uploaded post for virality potential.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::flows::{prompts, SUPPORTED_PLATFORMS};
use crate::gemini::prompts::system_for;
use crate::gemini::{GenerativeClient, ModelTier, TextRequest};
use crate::invoker::{invoke, require_filled, require_score, ContractViolation, OutputContract};
use crate::media::{parse_data_uri, MediaPayload};
use crate::schema::{ValidationFailure, Validator};
use crate::template::RenderContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAnalysisRequest {
    pub media: String,
    pub platform: String,
    pub user_input: Option<String>,
}

impl PostAnalysisRequest {
    pub fn validate(&self) -> Result<MediaPayload, ValidationFailure> {
        let mut v = Validator::new();
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
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

/// The virality audit of one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViralityAnalysis {
    pub is_viral: bool,
    pub virality_score: u32,
    pub reasoning: String,
    pub hook_analysis: String,
    pub content_analysis: String,
    pub cta_analysis: String,
    pub improvement_suggestions: Option<Vec<String>>,
}

impl OutputContract for ViralityAnalysis {
    fn check(&self) -> Result<(), ContractViolation> {
        require_score("viralityScore", self.virality_score)?;
        require_filled("reasoning", &self.reasoning)?;
        require_filled("hookAnalysis", &self.hook_analysis)?;
        require_filled("contentAnalysis", &self.content_analysis)?;
        require_filled("ctaAnalysis", &self.cta_analysis)?;
        if let Some(suggestions) = &self.improvement_suggestions {
            for s in suggestions {
                require_filled("improvementSuggestions", s)?;
            }
        }
        Ok(())
    }
}

/// Analyses an uploaded post and scores its virality potential.
pub async fn analyse_post(
    client: &dyn GenerativeClient,
    request: PostAnalysisRequest,
) -> Result<ViralityAnalysis, AppError> {
    let media = request.validate()?;

    let ctx = RenderContext::new()
        .text("platform", request.platform.trim())
        .text_opt("user_input", request.user_input.as_deref());
    let prompt = super::render_prompt(&prompts::analysis_template(), &ctx)?;

    info!(
        platform = %request.platform,
        mime = %media.mime_type,
        "analysing post"
    );

    let analysis = invoke(
        client,
        "post_analysis",
        TextRequest {
            system: system_for(prompts::ANALYSIS_ROLE),
            prompt,
            media: Some(media),
            tier: ModelTier::Quality,
        },
    )
    .await?;
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::ScriptedClient;
    use crate::invoker::GenerationError;

    const TINY_PNG_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn request() -> PostAnalysisRequest {
        PostAnalysisRequest {
            media: TINY_PNG_URI.to_string(),
            platform: "Instagram".to_string(),
            user_input: None,
        }
    }

    fn analysis_json(score: u32, with_suggestions: bool) -> String {
        let suggestions = if with_suggestions {
            r#", "improvementSuggestions": ["Tighten the first second", "End with a question"]"#
        } else {
            ""
        };
        format!(
            r#"{{
                "isViral": false,
                "viralityScore": {score},
                "reasoning": "Solid but slow start",
                "hookAnalysis": "Hook lands at second 3",
                "contentAnalysis": "Good pacing after the open",
                "ctaAnalysis": "No CTA present"{suggestions}
            }}"#
        )
    }

    #[tokio::test]
    async fn test_analysis_happy_path() {
        let client = ScriptedClient::new().push_json(&analysis_json(62, true));
        let analysis = analyse_post(&client, request()).await.unwrap();
        assert_eq!(analysis.virality_score, 62);
        assert!(!analysis.is_viral);
        assert_eq!(analysis.improvement_suggestions.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_suggestions_are_optional() {
        let client = ScriptedClient::new().push_json(&analysis_json(88, false));
        let analysis = analyse_post(&client, request()).await.unwrap();
        assert!(analysis.improvement_suggestions.is_none());
    }

    #[tokio::test]
    async fn test_rejects_score_above_100() {
        let client = ScriptedClient::new().push_json(&analysis_json(140, false));
        let err = analyse_post(&client, request()).await.unwrap_err();
        match err {
            AppError::Generation(GenerationError::Contract(v)) => {
                assert_eq!(v.field, "viralityScore");
            }
            other => panic!("expected contract violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_analysis_field_is_a_parse_failure() {
        let client = ScriptedClient::new().push_json(r#"{"isViral": true, "viralityScore": 80}"#);
        let err = analyse_post(&client, request()).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(GenerationError::Parse(_))));
    }

    #[tokio::test]
    async fn test_video_media_is_accepted() {
        let client = ScriptedClient::new().push_json(&analysis_json(50, false));
        let video = PostAnalysisRequest {
            media: "data:video/mp4;base64,AAAA".to_string(),
            ..request()
        };
        analyse_post(&client, video).await.unwrap();
        let requests = client.text_requests.lock().unwrap();
        assert_eq!(requests[0].media.as_ref().unwrap().mime_type, "video/mp4");
    }
}
