//! DTOs for the shortening endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{TimestampSeconds, serde_as};

use crate::domain::entities::Mapping;

/// Body of `POST /shorten`.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(rename = "longUrl")]
    pub long_url: String,
}

/// Body of `POST /custom`.
#[derive(Debug, Deserialize)]
pub struct CustomRequest {
    #[serde(rename = "longUrl")]
    pub long_url: String,

    #[serde(rename = "customCode")]
    pub custom_code: String,
}

/// Response for a newly created mapping.
///
/// ```json
/// {
///   "newUrl": "http://localhost:5000/Xb3_k9Qa",
///   "expires": "2026-10-23 12:00:00 UTC",
///   "db_id": "Xb3_k9Qa"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    #[serde(rename = "newUrl")]
    pub new_url: String,
    pub expires: String,
    pub db_id: String,
}

impl From<&Mapping> for CreatedResponse {
    fn from(mapping: &Mapping) -> Self {
        Self {
            new_url: mapping.short_url.clone(),
            expires: mapping.expires_display(),
            db_id: mapping.code.clone(),
        }
    }
}

/// A stored mapping as a document, timestamps in Unix seconds.
///
/// Returned when a generated code already maps to the submitted URL.
#[serde_as]
#[derive(Debug, Serialize)]
pub struct MappingDocument {
    #[serde(rename = "urlCode")]
    pub url_code: String,
    #[serde(rename = "longUrl")]
    pub long_url: String,
    #[serde(rename = "shortUrl")]
    pub short_url: String,
    #[serde(rename = "postedDate")]
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub posted_date: DateTime<Utc>,
    #[serde(rename = "expiresDate")]
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub expires_date: DateTime<Utc>,
}

impl From<Mapping> for MappingDocument {
    fn from(mapping: Mapping) -> Self {
        Self {
            url_code: mapping.code,
            long_url: mapping.long_url,
            short_url: mapping.short_url,
            posted_date: mapping.posted_at,
            expires_date: mapping.expires_at,
        }
    }
}
