//! In-memory implementation of the mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::{InsertOutcome, MappingRepository};
use crate::error::AppError;

/// Process-local mapping store backed by a sharded `DashMap`.
///
/// Used when no database is configured and throughout the test suite.
/// Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryMappingRepository {
    storage: DashMap<String, Mapping>,
}

impl InMemoryMappingRepository {
    pub fn new() -> Self {
        debug!("Using in-memory mapping store");
        Self {
            storage: DashMap::new(),
        }
    }
}

#[async_trait]
impl MappingRepository for InMemoryMappingRepository {
    async fn get(&self, code: &str) -> Result<Option<Mapping>, AppError> {
        Ok(self.storage.get(code).map(|entry| entry.value().clone()))
    }

    async fn put(&self, mapping: Mapping) -> Result<(), AppError> {
        self.storage.insert(mapping.code.clone(), mapping);
        Ok(())
    }

    async fn insert_if_absent(&self, new_mapping: NewMapping) -> Result<InsertOutcome, AppError> {
        // The entry guard holds the shard lock, so check and insert are atomic.
        match self.storage.entry(new_mapping.code.clone()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Occupied(existing.get().clone())),
            Entry::Vacant(slot) => {
                let mapping = new_mapping.into_mapping();
                slot.insert(mapping.clone());
                Ok(InsertOutcome::Inserted(mapping))
            }
        }
    }

    async fn find_expired(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Mapping>, AppError> {
        let mut expired: Vec<Mapping> = self
            .storage
            .iter()
            .filter(|entry| entry.value().is_expired_at(before))
            .map(|entry| entry.value().clone())
            .collect();

        expired.sort_by(|a, b| a.expires_at.cmp(&b.expires_at));
        expired.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(expired)
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.storage.remove(code).is_some())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.storage.len() as i64)
    }

    async fn count_expired(&self, before: DateTime<Utc>) -> Result<i64, AppError> {
        Ok(self
            .storage
            .iter()
            .filter(|entry| entry.value().is_expired_at(before))
            .count() as i64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn new_mapping(code: &str, url: &str, posted: i64) -> NewMapping {
        NewMapping::new(code, url, "http://s/", at(posted), Duration::days(7))
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = InMemoryMappingRepository::new();

        let outcome = repo
            .insert_if_absent(new_mapping("abcd", "https://example.com", 0))
            .await
            .unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted(_)));

        let stored = repo.get("abcd").await.unwrap().unwrap();
        assert_eq!(stored.code, "abcd");
        assert_eq!(stored.long_url, "https://example.com");
        assert_eq!(stored.short_url, "http://s/abcd");
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_mapping() {
        let repo = InMemoryMappingRepository::new();

        repo.insert_if_absent(new_mapping("promo", "https://first.com", 0))
            .await
            .unwrap();
        let outcome = repo
            .insert_if_absent(new_mapping("promo", "https://second.com", 10))
            .await
            .unwrap();

        match outcome {
            InsertOutcome::Occupied(existing) => {
                assert_eq!(existing.long_url, "https://first.com")
            }
            other => panic!("expected Occupied, got {:?}", other),
        }
        assert_eq!(
            repo.get("promo").await.unwrap().unwrap().long_url,
            "https://first.com"
        );
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let repo = InMemoryMappingRepository::new();
        let mut mapping = new_mapping("abcd", "https://old.com", 0).into_mapping();
        repo.put(mapping.clone()).await.unwrap();

        mapping.long_url = "https://new.com".to_string();
        repo.put(mapping).await.unwrap();

        assert_eq!(
            repo.get("abcd").await.unwrap().unwrap().long_url,
            "https://new.com"
        );
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_expired_orders_and_limits() {
        let repo = InMemoryMappingRepository::new();
        let week = 7 * 86_400;

        for (code, posted) in [("c3", 300), ("c1", 100), ("c2", 200), ("live", 10_000_000)] {
            repo.insert_if_absent(new_mapping(code, "https://e.com", posted))
                .await
                .unwrap();
        }

        let expired = repo.find_expired(at(week + 1_000), 10).await.unwrap();
        let codes: Vec<&str> = expired.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["c1", "c2", "c3"]);

        let page = repo.find_expired(at(week + 1_000), 2).await.unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_count_expired_counts_past_page_size() {
        let repo = InMemoryMappingRepository::new();

        for i in 0..600 {
            repo.insert_if_absent(new_mapping(&format!("old{i}"), "https://e.com", 0))
                .await
                .unwrap();
        }
        repo.insert_if_absent(new_mapping("live", "https://e.com", 10_000_000))
            .await
            .unwrap();

        assert_eq!(repo.count_expired(at(8 * 86_400)).await.unwrap(), 600);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryMappingRepository::new();
        repo.insert_if_absent(new_mapping("abcd", "https://e.com", 0))
            .await
            .unwrap();

        assert!(repo.delete("abcd").await.unwrap());
        assert!(!repo.delete("abcd").await.unwrap());
        assert!(repo.get("abcd").await.unwrap().is_none());
    }
}
