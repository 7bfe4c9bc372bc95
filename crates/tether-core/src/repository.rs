use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Store-assigned surrogate key of a [`LinkRecord`].
pub type LinkId = u64;

/// A persisted short link.
///
/// Only `click_count` (and `updated_at` alongside it) ever changes after the
/// record has been created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: LinkId,
    /// The short identifier, unique across all records.
    pub code: String,
    /// The destination URL.
    pub target: String,
    pub click_count: u64,
    /// `true` when `code` came from an identifier generator rather than a caller alias.
    pub is_generated: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a new link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub code: ShortCode,
    pub target: String,
}

impl NewLink {
    pub fn new(code: ShortCode, target: impl Into<String>) -> Self {
        Self {
            code,
            target: target.into(),
        }
    }

    pub fn is_generated(&self) -> bool {
        self.code.is_generated()
    }
}

/// The durable, authoritative store of short links.
///
/// Implementations must enforce uniqueness of `code` atomically: of any number
/// of concurrent inserts with the same code, exactly one succeeds and the rest
/// fail with [`StorageError::Conflict`].
#[async_trait]
pub trait LinkRepository: Send + Sync + 'static {
    /// Looks up a record by exact code match.
    /// Returns `None` if the code does not exist.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<LinkRecord>>;

    /// Persists a new link and returns the stored record.
    /// Returns `Err(Conflict)` if the code already exists.
    async fn insert(&self, link: NewLink) -> Result<LinkRecord>;

    /// Adds one to the click counter of the record with the given id.
    async fn increment_clicks(&self, id: LinkId) -> Result<()>;

    /// Adds one to the click counter of the record with the given code.
    async fn increment_clicks_by_code(&self, code: &ShortCode) -> Result<()>;

    /// Checks whether a short code already exists.
    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.find_by_code(code).await?.is_some())
    }
}
