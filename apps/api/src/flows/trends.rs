//! Trend flows — forecasting, the top-trends board, trend reasoning, and the
//! composite detail view that joins reasoning with a post plan.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::flows::{prompts, PostPlan, SUPPORTED_PLATFORMS, USER_TYPES};
use crate::gemini::prompts::system_for;
use crate::gemini::{GenerativeClient, ModelTier, TextRequest};
use crate::invoker::{
    invoke, join_pair, require_between, require_exact, require_filled, require_score,
    ContractViolation, OutputContract,
};
use crate::schema::{ValidationFailure, Validator};
use crate::template::RenderContext;

// ────────────────────────────────────────────────────────────────────────────
// Trend forecast
// ────────────────────────────────────────────────────────────────────────────

/// Request body for the trend-forecast flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendForecastRequest {
    pub platform: String,
    pub niche: String,
    pub region: String,
    pub user_type: String,
    pub best_time_to_post: Option<String>,
}

impl TrendForecastRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.require_text("niche", &self.niche, 2, 80);
        v.require_text("region", &self.region, 2, 80);
        v.require_member("userType", &self.user_type, USER_TYPES);
        v.optional_text("bestTimeToPost", self.best_time_to_post.as_deref(), 2, 80);
        v.finish()
    }
}

/// One forecasted trend with its ready-to-publish plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastedTrend {
    pub name: String,
    pub description: String,
    pub virality_score: u32,
    pub post_plan: PostPlan,
}

/// The full forecast: exactly 5 trends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendForecast {
    pub trends: Vec<ForecastedTrend>,
}

impl OutputContract for TrendForecast {
    fn check(&self) -> Result<(), ContractViolation> {
        require_exact("trends", self.trends.len(), 5)?;
        for trend in &self.trends {
            require_filled("trends.name", &trend.name)?;
            require_score("trends.viralityScore", trend.virality_score)?;
            trend.post_plan.check()?;
        }
        Ok(())
    }
}

/// Forecasts 5 upcoming trends for the given platform/niche/region.
pub async fn forecast_trends(
    client: &dyn GenerativeClient,
    request: TrendForecastRequest,
) -> Result<TrendForecast, AppError> {
    request.validate()?;
    let prompt = build_forecast_prompt(&request, &today())?;

    info!(
        platform = %request.platform,
        niche = %request.niche,
        "forecasting trends"
    );

    let forecast = invoke(
        client,
        "trend_forecast",
        TextRequest {
            system: system_for(prompts::TREND_FORECAST_ROLE),
            prompt,
            media: None,
            tier: ModelTier::Quality,
        },
    )
    .await?;
    Ok(forecast)
}

fn build_forecast_prompt(
    request: &TrendForecastRequest,
    today: &str,
) -> Result<String, AppError> {
    let ctx = RenderContext::new()
        .text("platform", request.platform.trim())
        .text("niche", request.niche.trim())
        .text("region", request.region.trim())
        .text("user_type", request.user_type.trim())
        .text_opt("best_time_to_post", request.best_time_to_post.as_deref())
        .text("today", today);
    super::render_prompt(&prompts::trend_forecast_template(), &ctx)
}

// ────────────────────────────────────────────────────────────────────────────
// Top trends
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTrendsRequest {
    pub platform: String,
    pub region: String,
    pub niche: Option<String>,
}

impl TopTrendsRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.require_text("region", &self.region, 2, 80);
        v.optional_text("niche", self.niche.as_deref(), 2, 80);
        v.finish()
    }
}

const MOMENTUM_VALUES: &[&str] = &["rising", "peaking", "declining"];

/// One row of the top-trends board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub name: String,
    pub category: String,
    pub momentum: String,
    pub virality_score: u32,
}

/// The top-trends board: 12-15 entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTrends {
    pub trends: Vec<TrendSummary>,
}

impl OutputContract for TopTrends {
    fn check(&self) -> Result<(), ContractViolation> {
        require_between("trends", self.trends.len(), 12, 15)?;
        for trend in &self.trends {
            require_filled("trends.name", &trend.name)?;
            require_score("trends.viralityScore", trend.virality_score)?;
            if !MOMENTUM_VALUES.contains(&trend.momentum.as_str()) {
                return Err(ContractViolation::new(
                    "trends.momentum",
                    format!(
                        "'{}' is not one of: {}",
                        trend.momentum,
                        MOMENTUM_VALUES.join(", ")
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Lists the 12-15 trends currently performing best.
pub async fn top_trends(
    client: &dyn GenerativeClient,
    request: TopTrendsRequest,
) -> Result<TopTrends, AppError> {
    request.validate()?;

    let ctx = RenderContext::new()
        .text("platform", request.platform.trim())
        .text("region", request.region.trim())
        .text_opt("niche", request.niche.as_deref())
        .text("today", today());
    let prompt = super::render_prompt(&prompts::top_trends_template(), &ctx)?;

    let board = invoke(
        client,
        "top_trends",
        TextRequest {
            system: system_for(prompts::TOP_TRENDS_ROLE),
            prompt,
            media: None,
            tier: ModelTier::Fast,
        },
    )
    .await?;
    Ok(board)
}

// ────────────────────────────────────────────────────────────────────────────
// Trend reasoning and the composite detail view
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReasoningRequest {
    pub trend_name: String,
    pub platform: String,
    pub niche: String,
}

impl TrendReasoningRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_text("trendName", &self.trend_name, 2, 120);
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.require_text("niche", &self.niche, 2, 80);
        v.finish()
    }
}

/// Why a trend works, who it reaches, and how long it will last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReasoning {
    pub summary: String,
    pub why_trending: String,
    pub audience_insight: String,
    pub longevity: String,
}

impl OutputContract for TrendReasoning {
    fn check(&self) -> Result<(), ContractViolation> {
        require_filled("summary", &self.summary)?;
        require_filled("whyTrending", &self.why_trending)?;
        require_filled("audienceInsight", &self.audience_insight)?;
        require_filled("longevity", &self.longevity)
    }
}

/// Explains a single trend.
pub async fn trend_reasoning(
    client: &dyn GenerativeClient,
    request: TrendReasoningRequest,
) -> Result<TrendReasoning, AppError> {
    request.validate()?;
    let prompt = build_reasoning_prompt(&request.trend_name, &request.platform, &request.niche)?;

    let reasoning = invoke(
        client,
        "trend_reasoning",
        TextRequest {
            system: system_for(prompts::TREND_REASONING_ROLE),
            prompt,
            media: None,
            tier: ModelTier::Fast,
        },
    )
    .await?;
    Ok(reasoning)
}

fn build_reasoning_prompt(
    trend_name: &str,
    platform: &str,
    niche: &str,
) -> Result<String, AppError> {
    let ctx = RenderContext::new()
        .text("trend_name", trend_name.trim())
        .text("platform", platform.trim())
        .text("niche", niche.trim());
    super::render_prompt(&prompts::trend_reasoning_template(), &ctx)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDetailRequest {
    pub trend_name: String,
    pub platform: String,
    pub niche: String,
    pub user_type: String,
}

impl TrendDetailRequest {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut v = Validator::new();
        v.require_text("trendName", &self.trend_name, 2, 120);
        v.require_member("platform", &self.platform, SUPPORTED_PLATFORMS);
        v.require_text("niche", &self.niche, 2, 80);
        v.require_member("userType", &self.user_type, USER_TYPES);
        v.finish()
    }
}

/// The composite detail view: reasoning plus a ready-to-publish plan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDetail {
    pub reasoning: TrendReasoning,
    pub post_plan: PostPlan,
}

/// Fetches trend reasoning and a post plan concurrently. All-or-nothing:
/// if either sub-generation fails, the whole detail view fails with the
/// failing branch (or branches) retained in the error.
pub async fn trend_detail(
    client: &dyn GenerativeClient,
    request: TrendDetailRequest,
) -> Result<TrendDetail, AppError> {
    request.validate()?;

    let reasoning_prompt =
        build_reasoning_prompt(&request.trend_name, &request.platform, &request.niche)?;
    let plan_ctx = RenderContext::new()
        .text("trend_name", request.trend_name.trim())
        .text("platform", request.platform.trim())
        .text("niche", request.niche.trim())
        .text("user_type", request.user_type.trim());
    let plan_prompt = super::render_prompt(&prompts::trend_post_plan_template(), &plan_ctx)?;

    info!(trend = %request.trend_name, "assembling composite trend detail");

    let (reasoning, plan) = {
        let reasoning_fut = invoke::<TrendReasoning>(
            client,
            "trend_reasoning",
            TextRequest {
                system: system_for(prompts::TREND_REASONING_ROLE),
                prompt: reasoning_prompt,
                media: None,
                tier: ModelTier::Fast,
            },
        );
        let plan_fut = invoke::<PostPlan>(
            client,
            "trend_post_plan",
            TextRequest {
                system: system_for(prompts::POST_PLAN_ROLE),
                prompt: plan_prompt,
                media: None,
                tier: ModelTier::Fast,
            },
        );
        let (reasoning_result, plan_result) = tokio::join!(reasoning_fut, plan_fut);
        join_pair(
            "trend_reasoning",
            "trend_post_plan",
            reasoning_result,
            plan_result,
        )?
    };

    Ok(TrendDetail {
        reasoning,
        post_plan: plan,
    })
}

fn today() -> String {
    Utc::now().date_naive().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
