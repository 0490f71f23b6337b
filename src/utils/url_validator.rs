//! Validation of destination URLs submitted for shortening.
//!
//! URLs are checked, never rewritten: the string the owner submitted is the
//! string that gets stored, deduplicated on and redirected to.

use url::Url;

/// Reasons a destination URL is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL exceeds the maximum length of {max} characters")]
    TooLong { max: usize },

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Checks that `input` is an absolute HTTP(S) URL with a host and at most
/// `max_length` bytes long.
///
/// Rejects `javascript:`, `data:`, `file:` and every other non-HTTP scheme.
///
/// # Errors
///
/// Returns the first [`UrlValidationError`] that applies.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_url("https://example.com", 2048).is_ok());
/// assert_eq!(
///     validate_url("javascript:alert(1)", 2048),
///     Err(UrlValidationError::UnsupportedProtocol)
/// );
/// ```
pub fn validate_url(input: &str, max_length: usize) -> Result<(), UrlValidationError> {
    if input.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if input.len() > max_length {
        return Err(UrlValidationError::TooLong { max: max_length });
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
