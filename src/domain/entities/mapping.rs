//! Mapping entity representing a shortened URL.

use chrono::{DateTime, Duration, Utc};

/// A stored association between a short code and a long URL.
///
/// `expires_at` is always `posted_at` plus the configured retention window.
/// Expiry is not enforced on read; expired mappings keep resolving until the
/// sweeper removes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub code: String,
    pub long_url: String,
    pub short_url: String,
    pub posted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Mapping {
    /// Returns true if the mapping expired strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Human-readable expiry, e.g. `2026-10-23 12:00:00 UTC`.
    pub fn expires_display(&self) -> String {
        self.expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// Input data for creating a new mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMapping {
    pub code: String,
    pub long_url: String,
    pub short_url: String,
    pub posted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewMapping {
    /// Builds a mapping posted at `now`, expiring `retention` later.
    ///
    /// `base_url` is expected to end with `/`.
    pub fn new(
        code: impl Into<String>,
        long_url: impl Into<String>,
        base_url: &str,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Self {
        let code = code.into();
        let short_url = format!("{}{}", base_url, code);

        Self {
            code,
            long_url: long_url.into(),
            short_url,
            posted_at: now,
            expires_at: now + retention,
        }
    }

    pub fn into_mapping(self) -> Mapping {
        Mapping {
            code: self.code,
            long_url: self.long_url,
            short_url: self.short_url,
            posted_at: self.posted_at,
            expires_at: self.expires_at,
        }
    }
}
