//! Long URL validation.
//!
//! A long URL is accepted when it parses as an absolute URL. The parser's
//! serialization is what gets stored: surrounding whitespace and embedded
//! tabs or newlines are dropped, so the stored form is always a valid
//! `Location` header value.

use url::Url;

/// Errors that can occur while validating a long URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("{0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL must not be empty")]
    Empty,
}

/// Checks that `raw` is an absolute URL.
///
/// # Errors
///
/// Returns [`UrlValidationError::Empty`] for blank input and
/// [`UrlValidationError::InvalidFormat`] with the parser's message otherwise,
/// e.g. `relative URL without a base`.
pub fn validate_long_url(raw: &str) -> Result<Url, UrlValidationError> {
    if raw.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    Ok(Url::parse(raw)?)
}
