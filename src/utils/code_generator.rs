//! Short code generation and validation utilities.
//!
//! Provides cryptographically secure random code generation and validation
//! for custom user-provided codes.

use crate::error::AppError;
use base64::Engine as _;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Length of random bytes before base64 encoding.
const CODE_LENGTH_BYTES: usize = 6;

/// Custom codes must be strictly longer than this.
const CUSTOM_CODE_MIN_EXCLUSIVE: usize = 3;

const CUSTOM_CODE_MAX: usize = 64;

/// Same alphabet the generator emits (URL-safe base64).
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex is valid"));

/// Reserved codes that cannot be used as short links.
///
/// These collide with fixed routes of the service.
pub const RESERVED_CODES: &[&str] = &["shorten", "custom", "health"];

/// The OS entropy source could not be read.
#[derive(Debug, thiserror::Error)]
#[error("Failed to generate short code: {0}")]
pub struct CodeGenerationError(#[from] getrandom::Error);

/// Source of generated short codes.
pub type CodeGenerator = fn() -> Result<String, CodeGenerationError>;

/// Generates a cryptographically secure random short code.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing an 8-character code.
///
/// # Errors
///
/// Returns [`CodeGenerationError`] if the system random number generator fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code()?;
/// assert_eq!(code.len(), 8);
/// ```
pub fn generate_code() -> Result<String, CodeGenerationError> {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer)?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: more than 3 and at most 64 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    let length = code.chars().count();

    if length <= CUSTOM_CODE_MIN_EXCLUSIVE {
        return Err(AppError::bad_request(
            "Custom Code should be more than 3 characters",
            json!({ "provided_length": length }),
        ));
    }

    if length > CUSTOM_CODE_MAX {
        return Err(AppError::bad_request(
            format!("Custom Code should be at most {} characters", CUSTOM_CODE_MAX),
            json!({ "provided_length": length }),
        ));
    }

    if !CUSTOM_CODE_REGEX.is_match(code) {
        return Err(AppError::bad_request(
            "Custom Code can only contain letters, digits, '-' and '_'",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
