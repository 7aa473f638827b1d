//! POV flow — writes 5 first-person POV video concepts for a scenario.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::flows::{prompts, SUPPORTED_PLATFORMS};
use crate::gemini::prompts::system_for;
use crate::gemini::{GenerativeClient, ModelTier, TextRequest};
use crate::invoker::{invoke, require_exact, require_filled, ContractViolation, OutputContract};
use crate::schema::{ValidationFailure, Validator};
use crate::template::RenderContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PovRequest {
    pub platform: String,
    pub niche: String,
    pub scenario: String,
    #[serde(default)]
    pub include_song: bool,
}

impl PovRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.require_text("niche", &self.niche, 2, 80);
        v.require_text("scenario", &self.scenario, 5, 300);
        v.finish()
    }
}

/// One POV concept. `song_suggestion` is present only when requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PovOption {
    pub hook: String,
    pub script: String,
    pub overlay_text: String,
    pub song_suggestion: Option<String>,
}

/// The POV set: exactly 5 options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PovSet {
    pub options: Vec<PovOption>,
}

impl OutputContract for PovSet {
    fn check(&self) -> Result<(), ContractViolation> {
        require_exact("options", self.options.len(), 5)?;
        for option in &self.options {
            require_filled("options.hook", &option.hook)?;
            require_filled("options.script", &option.script)?;
            require_filled("options.overlayText", &option.overlay_text)?;
        }
        Ok(())
    }
}

/// Generates 5 POV video concepts.
pub async fn generate_pov(
    client: &dyn GenerativeClient,
    request: PovRequest,
) -> Result<PovSet, AppError> {
    request.validate()?;

    let ctx = RenderContext::new()
        .text("platform", request.platform.trim())
        .text("niche", request.niche.trim())
        .text("scenario", request.scenario.trim())
        .flag("include_song", request.include_song);
    let prompt = super::render_prompt(&prompts::pov_template(), &ctx)?;

    info!(platform = %request.platform, "generating POV concepts");

    let set = invoke(
        client,
        "pov",
        TextRequest {
            system: system_for(prompts::POV_ROLE),
            prompt,
            media: None,
            tier: ModelTier::Fast,
        },
    )
    .await?;
    Ok(set)
}
