//! Bio flow — writes 5 platform-native profile bios.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::flows::{prompts, SUPPORTED_PLATFORMS, USER_TYPES};
use crate::gemini::prompts::system_for;
use crate::gemini::{GenerativeClient, ModelTier, TextRequest};
use crate::invoker::{
    invoke, require_exact, require_filled, ContractViolation, GenerationError, OutputContract,
};
use crate::schema::{ValidationFailure, Validator};
use crate::template::RenderContext;

/// Character limits the platforms enforce on profile bios. Anything not
/// listed gets the most common cap.
pub fn bio_char_limit(platform: &str) -> usize {
    let p = platform.trim().to_lowercase();
    match p.as_str() {
        "tiktok" => 80,
        "instagram" => 150,
        "x" => 160,
        "pinterest" => 160,
        "snapchat" => 80,
        "youtube" => 1000,
        "linkedin" => 220,
        _ => 150,
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BioRequest {
    pub platform: String,
    pub niche: String,
    pub user_type: String,
    pub tone: Option<String>,
    #[serde(default)]
    pub include_emojis: bool,
}

impl BioRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.require_text("niche", &self.niche, 2, 80);
        v.require_member("userType", &self.user_type, USER_TYPES);
        v.optional_text("tone", self.tone.as_deref(), 2, 40);
        v.finish()
    }
}

/// The bio set: exactly 5 non-empty bios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BioSet {
    pub bios: Vec<String>,
}

impl OutputContract for BioSet {
    fn check(&self) -> Result<(), ContractViolation> {
        require_exact("bios", self.bios.len(), 5)?;
        for bio in &self.bios {
            require_filled("bios", bio)?;
        }
        Ok(())
    }
}

/// Generates 5 bios, each within the platform's character limit.
pub async fn generate_bios(
    client: &dyn GenerativeClient,
    request: BioRequest,
) -> Result<BioSet, AppError> {
    request.validate()?;
    let limit = bio_char_limit(&request.platform);

    let ctx = RenderContext::new()
        .text("platform", request.platform.trim())
        .text("niche", request.niche.trim())
        .text("user_type", request.user_type.trim())
        .text_opt("tone", request.tone.as_deref())
        .flag("include_emojis", request.include_emojis)
        .text("char_limit", limit.to_string());
    let prompt = super::render_prompt(&prompts::bio_template(), &ctx)?;

    info!(platform = %request.platform, limit, "generating bios");

    let set: BioSet = invoke(
        client,
        "bios",
        TextRequest {
            system: system_for(prompts::BIO_ROLE),
            prompt,
            media: None,
            tier: ModelTier::Fast,
        },
    )
    .await?;

    // The platform limit depends on the request, so the generic contract
    // cannot see it; enforced here, still before anything reaches the caller.
    for bio in &set.bios {
        if bio.chars().count() > limit {
            return Err(AppError::Generation(GenerationError::Contract(
                ContractViolation::new(
                    "bios",
                    format!(
                        "bio of {} chars exceeds the {limit}-char limit for {}",
                        bio.chars().count(),
                        request.platform
                    ),
                ),
            )));
        }
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::ScriptedClient;

    fn request() -> BioRequest {
        BioRequest {
            platform: "TikTok".to_string(),
            niche: "fitness".to_string(),
            user_type: "Creator".to_string(),
            tone: None,
            include_emojis: false,
        }
    }

    fn bios_json(bios: &[&str]) -> String {
        serde_json::to_string(&serde_json::json!({ "bios": bios })).unwrap()
    }

    #[tokio::test]
    async fn test_returns_exactly_5_bios() {
        let client = ScriptedClient::new().push_json(&bios_json(&[
            "Coach. 5am club.",
            "Form first, ego last.",
            "Daily workouts that fit your lunch break.",
            "Helping 100k people lift smarter.",
            "Your gym buddy in your pocket.",
        ]));
        let set = generate_bios(&client, request()).await.unwrap();
        assert_eq!(set.bios.len(), 5);
    }

    #[tokio::test]
    async fn test_rejects_wrong_bio_count() {
        let client = ScriptedClient::new().push_json(&bios_json(&["one", "two", "three"]));
        let err = generate_bios(&client, request()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Generation(GenerationError::Contract(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_bio_over_platform_limit() {
        // TikTok caps bios at 80 chars.
        let long = "x".repeat(81);
        let client = ScriptedClient::new().push_json(&bios_json(&[
            "fine", "fine", "fine", "fine", &long,
        ]));
        let err = generate_bios(&client, request()).await.unwrap_err();
        match err {
            AppError::Generation(GenerationError::Contract(v)) => {
                assert!(v.message.contains("80-char limit"));
            }
            other => panic!("expected contract violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prompt_carries_platform_limit() {
        let client = ScriptedClient::new().push_json(&bios_json(&[
            "a", "b", "c", "d", "e",
        ]));
        generate_bios(&client, request()).await.unwrap();
        let requests = client.text_requests.lock().unwrap();
        assert!(requests[0].prompt.contains("at most 80 characters"));
    }

    #[test]
    fn test_bio_char_limits() {
        assert_eq!(bio_char_limit("TikTok"), 80);
        assert_eq!(bio_char_limit("instagram"), 150);
        assert_eq!(bio_char_limit("X"), 160);
        assert_eq!(bio_char_limit("SomethingNew"), 150);
    }
}
