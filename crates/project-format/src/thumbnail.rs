//! Data-URL helpers for project thumbnails.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::errors::ProjectError;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Encode image bytes as a data URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("{DATA_PREFIX}{mime}{BASE64_MARKER}{}", STANDARD.encode(bytes))
}

pub fn encode_png(bytes: &[u8]) -> String {
    encode_data_url("image/png", bytes)
}

/// Decode a base64 data URL. Only image media types are accepted.
pub fn decode_data_url(url: &str) -> Result<DataUrl, ProjectError> {
    let rest = url
        .strip_prefix(DATA_PREFIX)
        .ok_or_else(|| thumbnail_error("missing data: prefix"))?;
    let (mime, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| thumbnail_error("not base64 encoded"))?;
    if !mime.starts_with("image/") {
        return Err(thumbnail_error(&format!("unsupported media type {mime}")));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| thumbnail_error(&e.to_string()))?;
    Ok(DataUrl {
        mime: mime.to_string(),
        bytes,
    })
}

/// Reject thumbnails that are not decodable image data URLs.
pub fn validate(url: &str) -> Result<(), ProjectError> {
    decode_data_url(url).map(|_| ())
}

fn thumbnail_error(reason: &str) -> ProjectError {
    ProjectError::Thumbnail {
        reason: reason.to_string(),
    }
}
