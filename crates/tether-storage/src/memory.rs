use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_core::repository::{LinkId, LinkRecord, LinkRepository, NewLink, Result};
use tether_core::{ShortCode, StorageError};
use tracing::trace;

/// In-memory implementation of [`LinkRepository`] using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Uniqueness of codes is enforced through the
/// entry API, so racing inserts of the same code resolve to one winner.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    links: DashMap<String, LinkRecord>,
    codes_by_id: DashMap<LinkId, String>,
    last_id: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: DashMap::with_capacity(capacity),
            codes_by_id: DashMap::with_capacity(capacity),
            last_id: AtomicU64::new(0),
        }
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn bump(&self, code: &str) -> Result<()> {
        let Some(mut record) = self.links.get_mut(code) else {
            return Err(StorageError::InvalidData(format!(
                "no link with short code '{code}'"
            )));
        };
        record.click_count += 1;
        record.updated_at = Timestamp::now();
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<LinkRecord>> {
        Ok(self.links.get(code.as_str()).map(|entry| entry.clone()))
    }

    async fn insert(&self, link: NewLink) -> Result<LinkRecord> {
        let is_generated = link.is_generated();
        let key = link.code.as_str().to_owned();

        match self.links.entry(key.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(key)),
            Entry::Vacant(slot) => {
                let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
                let now = Timestamp::now();
                let record = LinkRecord {
                    id,
                    code: key.clone(),
                    target: link.target,
                    click_count: 0,
                    is_generated,
                    created_at: now,
                    updated_at: now,
                };
                self.codes_by_id.insert(id, key);
                slot.insert(record.clone());
                trace!(id, code = %record.code, "Inserted link into memory");
                Ok(record)
            }
        }
    }

    async fn increment_clicks(&self, id: LinkId) -> Result<()> {
        let code = self
            .codes_by_id
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::InvalidData(format!("no link with id {id}")))?;
        self.bump(&code)
    }

    async fn increment_clicks_by_code(&self, code: &ShortCode) -> Result<()> {
        self.bump(code.as_str())
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.links.contains_key(code.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn insert_and_find() {
        let repo = InMemoryRepository::new();

        let inserted = repo
            .insert(NewLink::new(code("abc123"), "https://example.com"))
            .await
            .unwrap();

        let found = repo.find_by_code(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(found, inserted);
        assert_eq!(found.target, "https://example.com");
        assert_eq!(found.click_count, 0);
        assert!(!found.is_generated);
        assert_eq!(found.created_at, found.updated_at);
    }

    #[tokio::test]
    async fn generated_flag_is_persisted() {
        let repo = InMemoryRepository::new();

        let record = repo
            .insert(NewLink::new(
                ShortCode::generated("Xy7pQ2"),
                "https://example.com",
            ))
            .await
            .unwrap();

        assert!(record.is_generated);
    }

    #[tokio::test]
    async fn find_nonexistent() {
        let repo = InMemoryRepository::new();

        assert!(repo.find_by_code(&code("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_monotonic() {
        let repo = InMemoryRepository::new();

        let first = repo
            .insert(NewLink::new(code("first"), "https://one.example"))
            .await
            .unwrap();
        let second = repo
            .insert(NewLink::new(code("second"), "https://two.example"))
            .await
            .unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn insert_conflict() {
        let repo = InMemoryRepository::new();

        repo.insert(NewLink::new(code("abc123"), "https://example.com"))
            .await
            .unwrap();

        let err = repo
            .insert(NewLink::new(code("abc123"), "https://other.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(c) if c == "abc123"));
        let kept = repo.find_by_code(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(kept.target, "https://example.com");
    }

    #[tokio::test]
    async fn increment_clicks_by_id_and_code() {
        let repo = InMemoryRepository::new();
        let record = repo
            .insert(NewLink::new(code("abc123"), "https://example.com"))
            .await
            .unwrap();

        repo.increment_clicks(record.id).await.unwrap();
        repo.increment_clicks_by_code(&code("abc123")).await.unwrap();

        let found = repo.find_by_code(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(found.click_count, 2);
        assert!(found.updated_at >= found.created_at);
    }

    #[tokio::test]
    async fn increment_unknown_link_fails() {
        let repo = InMemoryRepository::new();

        assert!(repo.increment_clicks(42).await.is_err());
        assert!(repo.increment_clicks_by_code(&code("nope")).await.is_err());
    }

    #[tokio::test]
    async fn exists_checks() {
        let repo = InMemoryRepository::new();

        assert!(!repo.exists(&code("abc123")).await.unwrap());

        repo.insert(NewLink::new(code("abc123"), "https://example.com"))
            .await
            .unwrap();

        assert!(repo.exists(&code("abc123")).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_of_same_code_have_one_winner() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.insert(NewLink::new(
                    code("contended"),
                    format!("https://example{i}.com"),
                ))
                .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(err) => assert!(matches!(err, StorageError::Conflict(_))),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let repo = Arc::new(InMemoryRepository::new());
        let record = repo
            .insert(NewLink::new(code("hot"), "https://example.com"))
            .await
            .unwrap();

        let mut handles = vec![];
        for _ in 0..50 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.increment_clicks(record.id).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let found = repo.find_by_code(&code("hot")).await.unwrap().unwrap();
        assert_eq!(found.click_count, 50);
    }
}
