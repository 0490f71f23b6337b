//! DTOs for short link endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a URL for the authenticated user.
///
/// Scheme, host and length checks happen in the link service; this only
/// rejects an empty body field early.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[serde(alias = "originalUrl")]
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkResponse {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
}

/// Result of a JSON lookup. Counts as a click.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveLinkResponse {
    pub short_code: String,
    pub original_url: String,
}
