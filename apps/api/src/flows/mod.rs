//! Content-generation flows — one module per capability.
//!
//! Every flow follows the same pipeline: validate the request against its
//! input schema, render a prompt from its template, invoke the model, and
//! return a contract-valid result or a typed failure. Shared output shapes
//! and the aspect-ratio derivation live here.

pub mod analysis;
pub mod bios;
pub mod captions;
pub mod handlers;
pub mod pov;
pub mod prompts;
pub mod repurpose;
pub mod trends;
pub mod visuals;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::gemini::AspectRatio;
use crate::invoker::{require_filled, ContractViolation, OutputContract};
use crate::template::{RenderContext, Template};

/// Platforms accepted by every flow's `platform` field.
pub const SUPPORTED_PLATFORMS: &[&str] = &[
    "TikTok",
    "Instagram",
    "YouTube",
    "Facebook",
    "X",
    "LinkedIn",
    "Pinterest",
    "Snapchat",
];

/// Accepted values for `userType`.
pub const USER_TYPES: &[&str] = &[
    "Influencer",
    "Creator",
    "Brand",
    "Small Business",
    "Marketer",
];

/// A ready-to-publish post plan. Produced by the trend-forecast, trend-detail
/// and URL-repurpose flows — all three share this exact shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPlan {
    pub hook: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub emoji_combo: String,
    pub suggested_post_format: String,
}

impl OutputContract for PostPlan {
    fn check(&self) -> Result<(), ContractViolation> {
        require_filled("hook", &self.hook)?;
        require_filled("caption", &self.caption)?;
        if self.hashtags.is_empty() {
            return Err(ContractViolation::new("hashtags", "must not be empty"));
        }
        require_filled("suggestedPostFormat", &self.suggested_post_format)
    }
}

/// Renders a flow's template against its context. A render failure means the
/// template and the context it was built with disagree — a programming error,
/// surfaced as an internal error rather than a generation failure.
pub(crate) fn render_prompt(
    template: &Template,
    ctx: &RenderContext,
) -> Result<String, AppError> {
    template.render(ctx).map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "prompt render failed for '{}': {e}",
            template.name()
        ))
    })
}

/// Maps a human-readable post format to the image aspect ratio used when
/// generating a visual for it. Pure; the whole table:
/// vertical formats (reels, shorts, TikToks, stories) render portrait,
/// Instagram/Facebook feed posts render square, everything else widescreen.
pub fn derive_aspect_ratio(post_format: &str) -> AspectRatio {
    let format = post_format.to_lowercase();
    if ["reel", "short", "tiktok", "story"]
        .iter()
        .any(|k| format.contains(k))
    {
        AspectRatio::Portrait
    } else if format.contains("post")
        && (format.contains("instagram") || format.contains("facebook"))
    {
        AspectRatio::Square
    } else {
        AspectRatio::Widescreen
    }
}
