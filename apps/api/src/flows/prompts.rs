//! Prompt templates for every capability.
//!
//! Templates are declared as node sequences (see `template`): fixed text,
//! variables bound at render time, and conditional blocks keyed on optional
//! fields. The JSON schema each prompt demands is spelled out inline, and
//! fixed collection counts are stated as hard rules — the invoker rejects
//! any response that does not match, so the model must be told exactly.

use crate::template::{lit, var, when, when_else, Template};

// ────────────────────────────────────────────────────────────────────────────
// Role framings (combined with the JSON-only rules via gemini::prompts)
// ────────────────────────────────────────────────────────────────────────────

pub const TREND_FORECAST_ROLE: &str = "You are a social media trend forecaster \
    with deep knowledge of platform algorithms and regional content culture.";

pub const TOP_TRENDS_ROLE: &str = "You are a social media analyst tracking \
    which formats, sounds, and topics are currently gaining traction.";

pub const TREND_REASONING_ROLE: &str = "You are a social media analyst who \
    explains why a trend works and how long it will last.";

pub const POST_PLAN_ROLE: &str = "You are a social media strategist who turns \
    trends into concrete, ready-to-publish post plans.";

pub const CAPTION_ROLE: &str = "You are a social media copywriter. You study \
    the attached media closely and write captions that match what is actually \
    in it.";

pub const BIO_ROLE: &str = "You are a personal-branding expert who writes \
    platform-native profile bios.";

pub const POV_ROLE: &str = "You are a short-form video scriptwriter who \
    specializes in first-person POV content.";

pub const ANALYSIS_ROLE: &str = "You are a social media growth consultant who \
    audits posts for virality potential.";

pub const REPURPOSE_ROLE: &str = "You are a content strategist who repurposes \
    existing web content into native social posts.";

pub const VISUAL_CONCEPT_ROLE: &str = "You are an art director for social \
    media visuals.";

// ────────────────────────────────────────────────────────────────────────────
// Trends
// ────────────────────────────────────────────────────────────────────────────

/// Variables: platform, niche, region, user_type, today.
/// Conditional: best_time_to_post.
pub fn trend_forecast_template() -> Template {
    Template::new(
        "trend_forecast",
        vec![
            lit("Forecast the next wave of content trends.\n\n"),
            lit("Platform: "),
            var("platform"),
            lit("\nNiche: "),
            var("niche"),
            lit("\nRegion: "),
            var("region"),
            lit("\nCreator type: "),
            var("user_type"),
            when(
                "best_time_to_post",
                vec![lit("\nPreferred posting time: "), var("best_time_to_post")],
            ),
            lit("\nToday's date: "),
            var("today"),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            lit(r##"{
  "trends": [
    {
      "name": "Thrift Flip Transitions",
      "description": "One sentence on what the trend is and why it fits this niche",
      "viralityScore": 87,
      "postPlan": {
        "hook": "First line that stops the scroll",
        "caption": "Full caption text",
        "hashtags": ["#tag1", "#tag2", "#tag3"],
        "emojiCombo": "🔥✨👗",
        "suggestedPostFormat": "Instagram Reel"
      }
    }
  ]
}"##),
            lit("\n\nHARD RULES:\n"),
            lit("1. Return EXACTLY 5 trends — not fewer, not more\n"),
            lit("2. viralityScore is an integer between 0 and 100\n"),
            lit("3. Every postPlan.hook must be non-empty and scroll-stopping\n"),
            lit("4. hashtags must contain at least 3 entries\n"),
            lit("5. suggestedPostFormat must be a real format on the given platform\n"),
            lit("6. Trends must be plausible for the region and date given — no evergreen filler"),
        ],
    )
}

/// Variables: platform, region, today. Conditional: niche.
pub fn top_trends_template() -> Template {
    Template::new(
        "top_trends",
        vec![
            lit("List the content trends currently performing best.\n\n"),
            lit("Platform: "),
            var("platform"),
            lit("\nRegion: "),
            var("region"),
            when_else(
                "niche",
                vec![lit("\nNiche: "), var("niche")],
                vec![lit("\nNiche: all niches")],
            ),
            lit("\nToday's date: "),
            var("today"),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            lit(r#"{
  "trends": [
    {
      "name": "Silent Vlogging",
      "category": "Lifestyle",
      "momentum": "rising",
      "viralityScore": 74
    }
  ]
}"#),
            lit("\n\nHARD RULES:\n"),
            lit("1. Return between 12 and 15 trends inclusive\n"),
            lit("2. momentum is exactly one of: \"rising\", \"peaking\", \"declining\"\n"),
            lit("3. viralityScore is an integer between 0 and 100\n"),
            lit("4. Order trends from highest to lowest momentum"),
        ],
    )
}

/// Variables: trend_name, platform, niche.
pub fn trend_reasoning_template() -> Template {
    Template::new(
        "trend_reasoning",
        vec![
            lit("Explain the trend \""),
            var("trend_name"),
            lit("\" on "),
            var("platform"),
            lit(" for the "),
            var("niche"),
            lit(" niche.\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            lit(r#"{
  "summary": "Two sentences on what the trend is",
  "whyTrending": "The psychological or algorithmic driver behind it",
  "audienceInsight": "Who engages with it and why",
  "longevity": "How long it is likely to last and the signal to watch"
}"#),
            lit("\n\nHARD RULES:\n"),
            lit("1. Every field must be non-empty\n"),
            lit("2. Be specific to the platform and niche — no generic filler"),
        ],
    )
}

/// Variables: trend_name, platform, niche, user_type.
pub fn trend_post_plan_template() -> Template {
    Template::new(
        "trend_post_plan",
        vec![
            lit("Create a ready-to-publish post plan riding the trend \""),
            var("trend_name"),
            lit("\".\n\nPlatform: "),
            var("platform"),
            lit("\nNiche: "),
            var("niche"),
            lit("\nCreator type: "),
            var("user_type"),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            post_plan_schema(),
            lit("\n\nHARD RULES:\n"),
            lit("1. hook must be non-empty and work as the first spoken or written line\n"),
            lit("2. hashtags must contain at least 3 entries mixing broad and niche tags\n"),
            lit("3. suggestedPostFormat must be a real format on the given platform"),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Captions
// ────────────────────────────────────────────────────────────────────────────

/// Variables: platform. Conditionals: niche, user_input, include_emojis.
/// The media itself travels as an attached payload, not through the template.
pub fn caption_template() -> Template {
    Template::new(
        "captions",
        vec![
            lit("Study the attached media and write captions for it.\n\n"),
            lit("Platform: "),
            var("platform"),
            when("niche", vec![lit("\nNiche: "), var("niche")]),
            when(
                "user_input",
                vec![lit("\nCreator's note about the media: "), var("user_input")],
            ),
            when_else(
                "include_emojis",
                vec![lit("\nInclude 2-3 fitting emojis in every caption.")],
                vec![lit("\nDo not use emojis.")],
            ),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            lit(r#"{
  "captions": [
    {"text": "The caption", "style": "witty"}
  ]
}"#),
            lit("\n\nHARD RULES:\n"),
            lit("1. Return EXACTLY 8 captions — not fewer, not more\n"),
            lit("2. Each caption must describe what is actually visible in the media\n"),
            lit("3. style is a one-word label (witty, heartfelt, bold, minimal, ...)\n"),
            lit("4. No two captions may share the same style\n"),
            lit("5. Keep each caption under the platform's comfortable caption length"),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Bios
// ────────────────────────────────────────────────────────────────────────────

/// Variables: platform, niche, user_type, char_limit.
/// Conditionals: tone, include_emojis.
pub fn bio_template() -> Template {
    Template::new(
        "bios",
        vec![
            lit("Write profile bios.\n\n"),
            lit("Platform: "),
            var("platform"),
            lit("\nNiche: "),
            var("niche"),
            lit("\nCreator type: "),
            var("user_type"),
            when("tone", vec![lit("\nDesired tone: "), var("tone")]),
            when_else(
                "include_emojis",
                vec![lit("\nUse emojis as visual separators.")],
                vec![lit("\nDo not use emojis.")],
            ),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            lit(r#"{
  "bios": ["First bio", "Second bio", "Third bio", "Fourth bio", "Fifth bio"]
}"#),
            lit("\n\nHARD RULES:\n"),
            lit("1. Return EXACTLY 5 bios — not fewer, not more\n"),
            lit("2. Each bio must be at most "),
            var("char_limit"),
            lit(" characters — the platform truncates beyond that\n"),
            lit("3. Each bio must include a clear value proposition or call to action\n"),
            lit("4. Vary the angle across the 5 bios (authority, relatability, results, ...)"),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// POV scripts
// ────────────────────────────────────────────────────────────────────────────

/// Variables: platform, niche, scenario. Conditional: include_song.
pub fn pov_template() -> Template {
    Template::new(
        "pov",
        vec![
            lit("Write first-person POV video concepts.\n\n"),
            lit("Platform: "),
            var("platform"),
            lit("\nNiche: "),
            var("niche"),
            lit("\nScenario: "),
            var("scenario"),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            when_else(
                "include_song",
                vec![lit(r#"{
  "options": [
    {
      "hook": "POV: first line of on-screen text",
      "script": "Beat-by-beat description of the video",
      "overlayText": "Text shown over the video",
      "songSuggestion": "Artist - Track (why it fits)"
    }
  ]
}"#)],
                vec![lit(r#"{
  "options": [
    {
      "hook": "POV: first line of on-screen text",
      "script": "Beat-by-beat description of the video",
      "overlayText": "Text shown over the video"
    }
  ]
}"#)],
            ),
            lit("\n\nHARD RULES:\n"),
            lit("1. Return EXACTLY 5 options — not fewer, not more\n"),
            lit("2. Every hook must start with \"POV:\"\n"),
            when(
                "include_song",
                vec![lit("3. Every option must include a songSuggestion that is currently usable on the platform\n")],
            ),
            lit("Keep each script filmable by one person with a phone."),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Post analysis
// ────────────────────────────────────────────────────────────────────────────

/// Variables: platform. Conditional: user_input.
/// The analysed media travels as an attached payload.
pub fn analysis_template() -> Template {
    Template::new(
        "post_analysis",
        vec![
            lit("Audit the attached post for virality potential.\n\n"),
            lit("Platform: "),
            var("platform"),
            when(
                "user_input",
                vec![lit("\nCreator's note: "), var("user_input")],
            ),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            lit(r#"{
  "isViral": true,
  "viralityScore": 62,
  "reasoning": "Overall judgement in 2-3 sentences",
  "hookAnalysis": "How well the first moment stops the scroll",
  "contentAnalysis": "Pacing, framing, and value of the body",
  "ctaAnalysis": "Strength of the call to action",
  "improvementSuggestions": ["Concrete change 1", "Concrete change 2"]
}"#),
            lit("\n\nHARD RULES:\n"),
            lit("1. viralityScore is an integer between 0 and 100\n"),
            lit("2. isViral is true only when viralityScore is 70 or above\n"),
            lit("3. Ground every judgement in what is actually visible in the media\n"),
            lit("4. improvementSuggestions may be omitted only when the post needs no changes"),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// URL repurposing
// ────────────────────────────────────────────────────────────────────────────

/// Variables: url, platform, user_type.
pub fn repurpose_template() -> Template {
    Template::new(
        "repurpose",
        vec![
            lit("Repurpose the content at this URL into a native social post.\n\n"),
            lit("URL: "),
            var("url"),
            lit("\nTarget platform: "),
            var("platform"),
            lit("\nCreator type: "),
            var("user_type"),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            post_plan_schema(),
            lit("\n\nHARD RULES:\n"),
            lit("1. The plan must stand alone — do not assume the reader opens the URL\n"),
            lit("2. hashtags must contain at least 3 entries\n"),
            lit("3. suggestedPostFormat must be a real format on the target platform"),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Visual concepts
// ────────────────────────────────────────────────────────────────────────────

/// Variables: topic, platform, post_format. Conditional: style_preference.
pub fn visual_concept_template() -> Template {
    Template::new(
        "visual_concept",
        vec![
            lit("Design a visual concept for a social post.\n\n"),
            lit("Topic: "),
            var("topic"),
            lit("\nPlatform: "),
            var("platform"),
            lit("\nPost format: "),
            var("post_format"),
            when(
                "style_preference",
                vec![lit("\nStyle preference: "), var("style_preference")],
            ),
            lit("\n\nReturn a JSON object with this EXACT schema (no extra fields):\n"),
            lit(r#"{
  "concept": "The core visual idea in 1-2 sentences",
  "composition": "Framing, focal point, and layout guidance",
  "palette": "3-5 colors with the mood they set",
  "imagePrompt": "A complete text-to-image prompt realizing the concept"
}"#),
            lit("\n\nHARD RULES:\n"),
            lit("1. Every field must be non-empty\n"),
            lit("2. imagePrompt must be self-contained — a text-to-image model sees only it\n"),
            lit("3. The concept must work at the aspect ratio native to the post format"),
        ],
    )
}

/// The post-plan JSON schema fragment shared by every flow that emits one.
fn post_plan_schema() -> crate::template::Node {
    lit(r##"{
  "hook": "First line that stops the scroll",
  "caption": "Full caption text",
  "hashtags": ["#tag1", "#tag2", "#tag3"],
  "emojiCombo": "🔥✨👗",
  "suggestedPostFormat": "Instagram Reel"
}"##)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RenderContext;

    #[test]
    fn test_trend_forecast_renders_with_and_without_posting_time() {
        let base = RenderContext::new()
            .text("platform", "TikTok")
            .text("niche", "fashion")
            .text("region", "USA")
            .text("user_type", "Influencer")
            .text("today", "2026-08-07");

        let without = trend_forecast_template().render(&base.clone()).unwrap();
        assert!(!without.contains("Preferred posting time"));
        assert!(without.contains("EXACTLY 5 trends"));

        let with = trend_forecast_template()
            .render(&base.text("best_time_to_post", "evenings"))
            .unwrap();
        assert!(with.contains("Preferred posting time: evenings"));
    }

    #[test]
    fn test_top_trends_defaults_niche_when_absent() {
        let ctx = RenderContext::new()
            .text("platform", "Instagram")
            .text("region", "UK")
            .text("today", "2026-08-07");
        let rendered = top_trends_template().render(&ctx).unwrap();
        assert!(rendered.contains("Niche: all niches"));
        assert!(rendered.contains("between 12 and 15 trends"));
    }

    #[test]
    fn test_pov_schema_tracks_song_flag() {
        let base = RenderContext::new()
            .text("platform", "TikTok")
            .text("niche", "fitness")
            .text("scenario", "first day at a new gym");

        let with = pov_template()
            .render(&base.clone().flag("include_song", true))
            .unwrap();
        assert!(with.contains("songSuggestion"));

        let without = pov_template()
            .render(&base.flag("include_song", false))
            .unwrap();
        assert!(!without.contains("songSuggestion"));
    }

    #[test]
    fn test_bio_template_binds_platform_char_limit() {
        let ctx = RenderContext::new()
            .text("platform", "Instagram")
            .text("niche", "travel")
            .text("user_type", "Creator")
            .text("char_limit", "150")
            .flag("include_emojis", false);
        let rendered = bio_template().render(&ctx).unwrap();
        assert!(rendered.contains("at most 150 characters"));
        assert!(rendered.contains("Do not use emojis."));
    }

    #[test]
    fn test_caption_template_emoji_branches_are_exclusive() {
        let base = RenderContext::new().text("platform", "Instagram");
        let with = caption_template()
            .render(&base.clone().flag("include_emojis", true))
            .unwrap();
        let without = caption_template()
            .render(&base.flag("include_emojis", false))
            .unwrap();
        assert!(with.contains("fitting emojis"));
        assert!(without.contains("Do not use emojis."));
        assert!(!without.contains("fitting emojis"));
    }

    #[test]
    fn test_repurpose_and_post_plan_share_schema_fragment() {
        let repurpose = repurpose_template()
            .render(
                &RenderContext::new()
                    .text("url", "https://example.com/article")
                    .text("platform", "LinkedIn")
                    .text("user_type", "Brand"),
            )
            .unwrap();
        let plan = trend_post_plan_template()
            .render(
                &RenderContext::new()
                    .text("trend_name", "Silent Vlogging")
                    .text("platform", "TikTok")
                    .text("niche", "lifestyle")
                    .text("user_type", "Creator"),
            )
            .unwrap();
        for field in ["\"hook\"", "\"caption\"", "\"hashtags\"", "\"emojiCombo\"", "\"suggestedPostFormat\""] {
            assert!(repurpose.contains(field));
            assert!(plan.contains(field));
        }
    }
}
