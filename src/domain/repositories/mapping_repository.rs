//! Repository trait for mapping data access.

use crate::domain::entities::{Mapping, NewMapping};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of an atomic create-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The code was free; this is the stored mapping.
    Inserted(Mapping),
    /// The code was taken; this is the mapping already holding it.
    Occupied(Mapping),
}

/// Store for mappings keyed by short code.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryMappingRepository`] - process-local
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Finds a mapping by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    async fn get(&self, code: &str) -> Result<Option<Mapping>, AppError>;

    /// Stores `mapping` under its code, replacing whatever was there.
    ///
    /// Does not enforce uniqueness; creation paths use
    /// [`MappingRepository::insert_if_absent`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    async fn put(&self, mapping: Mapping) -> Result<(), AppError>;

    /// Stores `new_mapping` only if its code is free, in one atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    async fn insert_if_absent(&self, new_mapping: NewMapping) -> Result<InsertOutcome, AppError>;

    /// Returns up to `limit` mappings with `expires_at < before`, oldest first.
    ///
    /// Callers page through expired mappings by deleting each returned page
    /// and querying again.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    async fn find_expired(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Mapping>, AppError>;

    /// Deletes a mapping by code.
    ///
    /// Returns `Ok(true)` if a mapping was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Counts stored mappings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Counts mappings with `expires_at < before`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    async fn count_expired(&self, before: DateTime<Utc>) -> Result<i64, AppError>;

    /// Short backend name used in logs and health output.
    fn backend(&self) -> &'static str;
}
