#![allow(dead_code)]

//! Input validation — structured per-field checks applied before any model call.
//!
//! Each request type owns a `validate()` that drives a `Validator`, collecting
//! every offending field instead of stopping at the first. A failed validation
//! never reaches the generation layer.

use serde::Serialize;
use thiserror::Error;

/// One offending input field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All input-schema violations for one request.
#[derive(Debug, Error)]
#[error("{}", summarize(.errors))]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects field errors across all checks for one request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Required text field with length bounds (chars, after trimming).
    pub fn require_text(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min {
            self.push(field, format!("must be at least {min} characters"));
        } else if len > max {
            self.push(field, format!("must be at most {max} characters"));
        }
    }

    /// Optional text field: only length-checked when present.
    pub fn optional_text(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) {
        if let Some(v) = value {
            self.require_text(field, v, min, max);
        }
    }

    /// Case-insensitive membership in a closed set.
    pub fn require_member(&mut self, field: &'static str, value: &str, allowed: &[&str]) {
        let ok = allowed.iter().any(|a| a.eq_ignore_ascii_case(value.trim()));
        if !ok {
            self.push(field, format!("must be one of: {}", allowed.join(", ")));
        }
    }

    /// http(s) URL with a non-empty host. Deliberately shallow — the model
    /// call is the real consumer, this only rejects obvious garbage early.
    pub fn require_url(&mut self, field: &'static str, value: &str) {
        let v = value.trim();
        let rest = v
            .strip_prefix("https://")
            .or_else(|| v.strip_prefix("http://"));
        let valid = match rest {
            Some(rest) => {
                let host = rest.split('/').next().unwrap_or("");
                !host.is_empty() && !v.contains(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            self.push(field, "must be a valid http(s) URL");
        }
    }

    pub fn require_range_u32(&mut self, field: &'static str, value: u32, min: u32, max: u32) {
        if value < min || value > max {
            self.push(field, format!("must be between {min} and {max}"));
        }
    }

    pub fn finish(self) -> Result<(), ValidationFailure> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure {
                errors: self.errors,
            })
        }
    }
}
