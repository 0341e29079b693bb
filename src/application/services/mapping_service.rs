//! Mapping creation, resolution and expiry sweeping.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info};

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::{InsertOutcome, MappingRepository};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, generate_code, validate_custom_code};
use crate::utils::url_validator::validate_long_url;

/// Generated-code attempts before giving up on collisions.
const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Page size used when sweeping expired mappings.
pub const SWEEP_BATCH_SIZE: i64 = 500;

/// Result of shortening with a generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenOutcome {
    /// A new mapping was stored.
    Created(Mapping),
    /// The generated code already mapped to the same long URL.
    Existing(Mapping),
}

/// Service for creating, resolving and expiring mappings.
///
/// Owns the immutable settings (`base_url`, retention) loaded at startup.
pub struct MappingService {
    repository: Arc<dyn MappingRepository>,
    base_url: String,
    retention: Duration,
    code_generator: CodeGenerator,
}

impl MappingService {
    /// Creates a new mapping service.
    ///
    /// `base_url` is used as the prefix of every short URL and should end
    /// with `/`.
    pub fn new(
        repository: Arc<dyn MappingRepository>,
        base_url: impl Into<String>,
        retention: Duration,
    ) -> Self {
        Self {
            repository,
            base_url: base_url.into(),
            retention,
            code_generator: generate_code,
        }
    }

    /// Replaces the source of generated codes (defaults to [`generate_code`]).
    pub fn with_code_generator(mut self, code_generator: CodeGenerator) -> Self {
        self.code_generator = code_generator;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn backend(&self) -> &'static str {
        self.repository.backend()
    }

    /// Shortens `long_url` under a freshly generated code.
    ///
    /// # Collisions
    ///
    /// If the generated code is already stored for the same long URL, the
    /// stored mapping is returned as [`ShortenOutcome::Existing`]. If it
    /// belongs to a different URL, a new code is generated, up to
    /// 10 attempts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not absolute.
    /// Returns [`AppError::Internal`] on store errors, entropy failure, or
    /// when every attempt collided.
    pub async fn shorten(&self, long_url: &str) -> Result<ShortenOutcome, AppError> {
        let long_url = Self::check_long_url(long_url)?;

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code = (self.code_generator)()?;
            let new_mapping = self.new_mapping(code, &long_url, Utc::now());

            match self.repository.insert_if_absent(new_mapping).await? {
                InsertOutcome::Inserted(mapping) => {
                    info!(code = %mapping.code, "Created mapping");
                    return Ok(ShortenOutcome::Created(mapping));
                }
                InsertOutcome::Occupied(existing) if existing.long_url == long_url => {
                    debug!(code = %existing.code, "Generated code already maps to this URL");
                    return Ok(ShortenOutcome::Existing(existing));
                }
                InsertOutcome::Occupied(existing) => {
                    debug!(code = %existing.code, attempt, "Generated code collided, retrying");
                }
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Stores `long_url` under a caller-chosen code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or the code is invalid.
    /// Returns [`AppError::Conflict`] if the code is already in use; the
    /// existing mapping is left untouched.
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn create_custom(
        &self,
        long_url: &str,
        custom_code: &str,
    ) -> Result<Mapping, AppError> {
        let long_url = Self::check_long_url(long_url)?;
        validate_custom_code(custom_code)?;

        let new_mapping = self.new_mapping(custom_code.to_string(), &long_url, Utc::now());

        match self.repository.insert_if_absent(new_mapping).await? {
            InsertOutcome::Inserted(mapping) => {
                info!(code = %mapping.code, "Created mapping with custom code");
                Ok(mapping)
            }
            InsertOutcome::Occupied(_) => Err(AppError::conflict(
                format!("Custom code: {} already in use", custom_code),
                json!({ "code": custom_code }),
            )),
        }
    }

    /// Looks up the mapping for `code`.
    ///
    /// Expiry is not checked here; expired mappings resolve until swept.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping exists.
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn resolve(&self, code: &str) -> Result<Mapping, AppError> {
        self.repository
            .get(code)
            .await?
            .ok_or_else(|| AppError::not_found("Url not Found", json!({ "code": code })))
    }

    /// Deletes every mapping that expired before now.
    ///
    /// See [`Self::sweep_expired_before`].
    pub async fn sweep_expired(&self) -> Result<usize, AppError> {
        self.sweep_expired_before(Utc::now()).await
    }

    /// Deletes every mapping whose expiry is strictly before `cutoff`.
    ///
    /// Pages through expired mappings, deleting each one, until a short page
    /// is returned. Returns the number of mappings deleted.
    ///
    /// # Errors
    ///
    /// The first store error aborts the sweep and is returned.
    pub async fn sweep_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, AppError> {
        debug!(cutoff = %cutoff, "Sweeping expired mappings");

        let mut deleted = 0;

        loop {
            let page = self
                .repository
                .find_expired(cutoff, SWEEP_BATCH_SIZE)
                .await?;
            let page_len = page.len();

            for mapping in page {
                info!("Deleting code {}", mapping.code);
                if self.repository.delete(&mapping.code).await? {
                    deleted += 1;
                }
            }

            if (page_len as i64) < SWEEP_BATCH_SIZE {
                break;
            }
        }

        Ok(deleted)
    }

    /// Counts stored mappings.
    pub async fn count(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }

    /// Counts mappings whose expiry is before `cutoff`.
    pub async fn count_expired(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError> {
        self.repository.count_expired(cutoff).await
    }

    fn new_mapping(&self, code: String, long_url: &str, now: DateTime<Utc>) -> NewMapping {
        NewMapping::new(code, long_url, &self.base_url, now, self.retention)
    }

    /// Returns the parsed, serialized form of `long_url`; that is what gets
    /// stored, so it is always a valid `Location` header value.
    fn check_long_url(long_url: &str) -> Result<String, AppError> {
        validate_long_url(long_url)
            .map(String::from)
            .map_err(|e| AppError::bad_request(e.to_string(), json!({ "longUrl": long_url })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockMappingRepository;
    use chrono::TimeZone;

    const BASE_URL: &str = "http://localhost:5000/";

    fn service(repo: MockMappingRepository) -> MappingService {
        MappingService::new(Arc::new(repo), BASE_URL, Duration::days(7))
    }

    fn stored(code: &str, url: &str) -> Mapping {
        NewMapping::new(code, url, BASE_URL, Utc::now(), Duration::days(7)).into_mapping()
    }

    #[tokio::test]
    async fn test_shorten_success() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent()
            .withf(|m| {
                m.long_url == "https://example.com/a"
                    && m.short_url == format!("{}{}", BASE_URL, m.code)
                    && m.expires_at - m.posted_at == Duration::days(7)
            })
            .times(1)
            .returning(|m| Ok(InsertOutcome::Inserted(m.into_mapping())));

        let outcome = service(repo).shorten("https://example.com/a").await.unwrap();

        match outcome {
            ShortenOutcome::Created(mapping) => {
                assert_eq!(mapping.long_url, "https://example.com/a");
                assert_eq!(mapping.code.len(), 8);
            }
            other => panic!("expected Created, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shorten_invalid_url_never_touches_store() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent().times(0);
        repo.expect_get().times(0);

        let result = service(repo).shorten("not-a-url").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_shorten_same_url_collision_returns_existing() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent()
            .times(1)
            .returning(|m| Ok(InsertOutcome::Occupied(stored(&m.code, "https://example.com/"))));

        let outcome = service(repo).shorten("https://example.com").await.unwrap();

        assert!(matches!(outcome, ShortenOutcome::Existing(m) if m.long_url == "https://example.com/"));
    }

    #[tokio::test]
    async fn test_shorten_different_url_collision_retries() {
        let mut repo = MockMappingRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_insert_if_absent()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|m| Ok(InsertOutcome::Occupied(stored(&m.code, "https://other.com"))));
        repo.expect_insert_if_absent()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|m| Ok(InsertOutcome::Inserted(m.into_mapping())));

        let outcome = service(repo).shorten("https://example.com").await.unwrap();

        assert!(matches!(outcome, ShortenOutcome::Created(m) if m.long_url == "https://example.com/"));
    }

    #[tokio::test]
    async fn test_shorten_gives_up_after_max_attempts() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|m| Ok(InsertOutcome::Occupied(stored(&m.code, "https://other.com"))));

        let err = service(repo).shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
        assert!(err.to_string().contains("Failed to generate unique code"));
    }

    #[tokio::test]
    async fn test_shorten_store_error_propagates() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent()
            .times(1)
            .returning(|_| Err(AppError::internal("connection refused", json!({}))));

        let err = service(repo).shorten("https://example.com").await.unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test]
    async fn test_create_custom_success() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent()
            .withf(|m| m.code == "promo" && m.short_url == "http://localhost:5000/promo")
            .times(1)
            .returning(|m| Ok(InsertOutcome::Inserted(m.into_mapping())));

        let mapping = service(repo)
            .create_custom("https://example.com/b", "promo")
            .await
            .unwrap();

        assert_eq!(mapping.code, "promo");
        assert_eq!(mapping.long_url, "https://example.com/b");
    }

    #[tokio::test]
    async fn test_create_custom_stores_normalized_url() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent()
            .withf(|m| m.long_url == "https://example.com/ab")
            .times(1)
            .returning(|m| Ok(InsertOutcome::Inserted(m.into_mapping())));

        let mapping = service(repo)
            .create_custom("  https://example.com/a\nb  ", "promo")
            .await
            .unwrap();

        assert_eq!(mapping.long_url, "https://example.com/ab");
    }

    #[tokio::test]
    async fn test_shorten_uses_injected_code_generator() {
        fn fixed() -> Result<String, crate::utils::code_generator::CodeGenerationError> {
            Ok("fixed123".to_string())
        }

        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent()
            .withf(|m| m.code == "fixed123")
            .times(1)
            .returning(|m| Ok(InsertOutcome::Inserted(m.into_mapping())));

        let outcome = service(repo)
            .with_code_generator(fixed)
            .shorten("https://example.com/a")
            .await
            .unwrap();

        assert!(matches!(outcome, ShortenOutcome::Created(m) if m.code == "fixed123"));
    }

    #[tokio::test]
    async fn test_create_custom_conflict() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent()
            .times(1)
            .returning(|m| Ok(InsertOutcome::Occupied(stored(&m.code, "https://example.com/b"))));

        let err = service(repo)
            .create_custom("https://example.com/b", "promo")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), "Custom code: promo already in use");
    }

    #[tokio::test]
    async fn test_create_custom_short_code_rejected_without_write() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent().times(0);

        let err = service(repo)
            .create_custom("https://example.com", "abc")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_string(), "Custom Code should be more than 3 characters");
    }

    #[tokio::test]
    async fn test_create_custom_checks_url_first() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert_if_absent().times(0);

        let err = service(repo)
            .create_custom("relative/path", "ab")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "relative URL without a base");
    }

    #[tokio::test]
    async fn test_resolve_found_and_missing() {
        let mut repo = MockMappingRepository::new();
        repo.expect_get()
            .withf(|code| code == "abcd")
            .returning(|code| Ok(Some(stored(code, "https://example.com"))));
        repo.expect_get()
            .withf(|code| code == "nope")
            .returning(|_| Ok(None));

        let service = service(repo);

        assert_eq!(
            service.resolve("abcd").await.unwrap().long_url,
            "https://example.com"
        );
        assert!(matches!(
            service.resolve("nope").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sweep_deletes_every_expired_mapping() {
        let cutoff = Utc.timestamp_opt(1_000_000, 0).unwrap();
        let mut repo = MockMappingRepository::new();
        repo.expect_find_expired()
            .withf(move |before, limit| *before == cutoff && *limit == SWEEP_BATCH_SIZE)
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    stored("old1", "https://a.com"),
                    stored("old2", "https://b.com"),
                ])
            });
        repo.expect_delete().times(2).returning(|_| Ok(true));

        let deleted = service(repo).sweep_expired_before(cutoff).await.unwrap();

        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn test_sweep_pages_until_short_page() {
        let mut repo = MockMappingRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_find_expired()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, limit| {
                Ok((0..limit)
                    .map(|i| stored(&format!("c{i}"), "https://a.com"))
                    .collect())
            });
        repo.expect_find_expired()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(vec![stored("last", "https://a.com")]));
        repo.expect_delete().returning(|_| Ok(true));

        let deleted = service(repo).sweep_expired().await.unwrap();

        assert_eq!(deleted, SWEEP_BATCH_SIZE as usize + 1);
    }

    #[tokio::test]
    async fn test_count_expired_is_not_capped_by_page_size() {
        let mut repo = MockMappingRepository::new();
        repo.expect_count_expired().times(1).returning(|_| Ok(1_234));
        repo.expect_find_expired().times(0);

        let pending = service(repo).count_expired(Utc::now()).await.unwrap();

        assert_eq!(pending, 1_234);
    }

    #[tokio::test]
    async fn test_sweep_aborts_on_query_error() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_expired()
            .times(1)
            .returning(|_, _| Err(AppError::internal("query failed", json!({}))));
        repo.expect_delete().times(0);

        let result = service(repo).sweep_expired().await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }
}
