use thiserror::Error;

/// Errors raised by a [`UrlCache`](crate::UrlCache) backend.
///
/// Services never surface these to their callers: a failing cache is
/// treated as a cache miss.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache serialization failed: {0}")]
    Serialization(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Errors raised by a [`LinkRepository`](crate::LinkRepository) backend.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Outcomes of a failed link creation.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("bad input: {0}")]
    BadInput(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("short code already in use: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => Self::Conflict(code),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

/// Outcomes of a failed short code resolution.
#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StorageError> for RedirectorError {
    fn from(value: StorageError) -> Self {
        Self::StoreUnavailable(value.to_string())
    }
}
