//! Media payloads — decoding `data:<mime>;base64,<payload>` URIs from upload forms.
//!
//! The browser submits uploaded images/videos as data URIs inside the JSON
//! body. They are decoded exactly once, at validation time, into a MIME-typed
//! byte payload that travels with the prompt.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

/// Decoded media cap. Vision models reject far smaller payloads anyway;
/// this bounds memory per request.
pub const MAX_MEDIA_BYTES: usize = 8 * 1024 * 1024;

/// A decoded upload, ready to attach to a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPayload {
    pub mime_type: String,
    pub data: Bytes,
}

#[derive(Debug, Error, PartialEq)]
pub enum MediaError {
    #[error("not a data URI")]
    NotADataUri,

    #[error("data URI is missing a MIME type")]
    MissingMime,

    #[error("unsupported media type '{0}' (expected image/* or video/*)")]
    UnsupportedMime(String),

    #[error("data URI is not base64-encoded")]
    NotBase64Encoded,

    #[error("media payload is not valid base64")]
    InvalidBase64,

    #[error("media payload exceeds {MAX_MEDIA_BYTES} bytes")]
    TooLarge,
}

/// Parses a `data:<mime>;base64,<payload>` URI into a [`MediaPayload`].
pub fn parse_data_uri(uri: &str) -> Result<MediaPayload, MediaError> {
    let rest = uri.strip_prefix("data:").ok_or(MediaError::NotADataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::NotADataUri)?;

    let mime_type = match header.strip_suffix(";base64") {
        Some(mime) => mime,
        None => return Err(MediaError::NotBase64Encoded),
    };
    if mime_type.is_empty() {
        return Err(MediaError::MissingMime);
    }
    if !mime_type.starts_with("image/") && !mime_type.starts_with("video/") {
        return Err(MediaError::UnsupportedMime(mime_type.to_string()));
    }

    let data = BASE64
        .decode(payload.trim())
        .map_err(|_| MediaError::InvalidBase64)?;
    if data.len() > MAX_MEDIA_BYTES {
        return Err(MediaError::TooLarge);
    }

    Ok(MediaPayload {
        mime_type: mime_type.to_string(),
        data: Bytes::from(data),
    })
}
