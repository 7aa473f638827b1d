//! Generation invoker — the one generic engine every flow drives.
//!
//! One call = render → model → parse → contract check. The model is an
//! untrusted dependency: its output is either coerced into a value that
//! satisfies the capability's output contract exactly, or the call fails
//! with a typed [`GenerationError`]. Nothing partially-shaped ever reaches
//! a caller.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::gemini::{GeminiError, GenerativeClient, TextRequest};

/// A single violated output-contract rule.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ContractViolation {
    pub field: String,
    pub message: String,
}

impl ContractViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The shape-and-constraint check every generated output type implements.
/// Deserialization proves field presence and types; `check` proves the
/// rest: collection counts, numeric ranges, non-empty text.
pub trait OutputContract {
    fn check(&self) -> Result<(), ContractViolation>;
}

/// Why a single generation call failed. Surfaced to callers as-is — never
/// coerced into an empty or default success value.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model call failed: {0}")]
    Client(#[from] GeminiError),

    #[error("model output was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model output violated the output contract: {0}")]
    Contract(#[from] ContractViolation),
}

/// Submits a rendered prompt and returns a contract-valid `T` or fails.
pub async fn invoke<T>(
    client: &dyn GenerativeClient,
    capability: &'static str,
    request: TextRequest,
) -> Result<T, GenerationError>
where
    T: DeserializeOwned + OutputContract,
{
    let request_id = Uuid::new_v4();
    debug!(%request_id, capability, "dispatching generation request");

    let raw = client.generate_text(request).await.map_err(|e| {
        warn!(%request_id, capability, error = %e, "model call failed");
        e
    })?;

    let text = strip_json_fences(&raw);
    let value: T = serde_json::from_str(text).map_err(|e| {
        warn!(%request_id, capability, error = %e, "model output failed to parse");
        e
    })?;

    value.check().map_err(|v| {
        warn!(%request_id, capability, violation = %v, "model output violated contract");
        v
    })?;

    info!(%request_id, capability, "generation succeeded");
    Ok(value)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Composite joins
// ────────────────────────────────────────────────────────────────────────────

/// Failure of a composite flow that joins two concurrent sub-generations.
/// Retains which branch failed and its underlying error for diagnostics.
#[derive(Debug, Error)]
pub enum CompositeFailure {
    #[error("'{label}' sub-generation failed: {source}")]
    First {
        label: &'static str,
        source: GenerationError,
    },

    #[error("'{label}' sub-generation failed: {source}")]
    Second {
        label: &'static str,
        source: GenerationError,
    },

    #[error("'{first_label}' and '{second_label}' sub-generations both failed: {first}; {second}")]
    Both {
        first_label: &'static str,
        second_label: &'static str,
        first: GenerationError,
        second: GenerationError,
    },
}

/// Joins the outcomes of two concurrently-issued sub-generations.
/// All four outcomes are modelled explicitly; any failed branch fails the
/// composite, with both errors retained when both branches fail.
pub fn join_pair<A, B>(
    first_label: &'static str,
    second_label: &'static str,
    first: Result<A, GenerationError>,
    second: Result<B, GenerationError>,
) -> Result<(A, B), CompositeFailure> {
    match (first, second) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(e), Ok(_)) => Err(CompositeFailure::First {
            label: first_label,
            source: e,
        }),
        (Ok(_), Err(e)) => Err(CompositeFailure::Second {
            label: second_label,
            source: e,
        }),
        (Err(e1), Err(e2)) => Err(CompositeFailure::Both {
            first_label,
            second_label,
            first: e1,
            second: e2,
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Contract check helpers
// ────────────────────────────────────────────────────────────────────────────

/// Exact collection size.
pub fn require_exact(field: &str, len: usize, expected: usize) -> Result<(), ContractViolation> {
    if len == expected {
        Ok(())
    } else {
        Err(ContractViolation::new(
            field,
            format!("expected exactly {expected} items, got {len}"),
        ))
    }
}

/// Bounded collection size (inclusive).
pub fn require_between(
    field: &str,
    len: usize,
    min: usize,
    max: usize,
) -> Result<(), ContractViolation> {
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(ContractViolation::new(
            field,
            format!("expected between {min} and {max} items, got {len}"),
        ))
    }
}

/// A 0-100 score.
pub fn require_score(field: &str, score: u32) -> Result<(), ContractViolation> {
    if score <= 100 {
        Ok(())
    } else {
        Err(ContractViolation::new(
            field,
            format!("score {score} is outside 0-100"),
        ))
    }
}

/// Non-empty text after trimming.
pub fn require_filled(field: &str, value: &str) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        Err(ContractViolation::new(field, "must not be empty"))
    } else {
        Ok(())
    }
}
