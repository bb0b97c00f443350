use axum::http::{HeaderMap, header::AUTHORIZATION};

use crate::types::Image;

/// Image slots tried for a cover, in order. The provider lists images
/// largest first, so the medium rendition is preferred.
const COVER_IMAGE_PREFERENCE: [usize; 3] = [1, 0, 2];

/// Picks the cover url: `images[1]`, then `images[0]`, then `images[2]`.
pub fn cover_image(images: &[Image]) -> Option<&str> {
    COVER_IMAGE_PREFERENCE
        .iter()
        .find_map(|&slot| images.get(slot))
        .map(|image| image.url.as_str())
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
/// Any other scheme, or an empty token, counts as missing.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Reads an optional header as a trimmed, non-empty string.
pub fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
