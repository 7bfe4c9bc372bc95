use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A time-limited mapping from short code to target URL.
///
/// The cache is advisory: every entry can be re-derived from the durable
/// store, so callers treat any error as a cache miss. Implementations must be
/// safe to call concurrently and report transient unavailability as a
/// [`CacheError`] instead of panicking.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the target URL for a code.
    ///
    /// Returns `Ok(None)` if the key is not in the cache or has expired.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the target URL for a code, expiring after `ttl`.
    ///
    /// Overwrites any existing entry (last write wins).
    async fn set_url(&self, code: &ShortCode, target: &str, ttl: Duration) -> Result<()>;
}
