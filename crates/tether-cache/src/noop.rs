use async_trait::async_trait;
use std::time::Duration;
use tether_core::cache::{Result, UrlCache};
use tether_core::ShortCode;

/// A cache that stores nothing. Every lookup is a miss.
///
/// Used when caching is disabled; resolution then always reads the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUrlCache;

#[async_trait]
impl UrlCache for NoopUrlCache {
    async fn get_url(&self, _code: &ShortCode) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_url(&self, _code: &ShortCode, _target: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}
