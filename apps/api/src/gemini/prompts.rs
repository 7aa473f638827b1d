// Cross-cutting prompt fragments shared by every capability.
// Each flow defines its own templates in flows/prompts.rs alongside the
// services; this file holds only what is common to all of them.

/// System framing that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Combines a capability's role framing with the JSON-only rules.
pub fn system_for(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_for_appends_json_rules() {
        let system = system_for("You are a social media strategist.");
        assert!(system.starts_with("You are a social media strategist."));
        assert!(system.contains("valid JSON only"));
    }
}
