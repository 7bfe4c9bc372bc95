use async_trait::async_trait;
use std::time::Duration;
use tether_core::cache::{Result, UrlCache};
use tether_core::ShortCode;
use tracing::{debug, trace, warn};

/// A two-level cache composing a fast local L1 with a shared L2.
///
/// - **Get**: try L1; on miss (or L1 error) try L2. An L2 hit is backfilled
///   into L1 with `l1_ttl`, since the remaining L2 lifetime is unknown.
/// - **Set**: write L2 then L1. An L1 failure is logged; an L2 failure is
///   returned after L1 has still been written.
///
/// `l1_ttl` should not exceed the TTL used for writes, so L1 never outlives
/// what a single-level cache would have held.
#[derive(Debug, Clone)]
pub struct LayeredCache<L1, L2> {
    l1: L1,
    l2: L2,
    l1_ttl: Duration,
}

impl<L1, L2> LayeredCache<L1, L2> {
    /// Creates a new layered cache with the given L1 and L2 caches.
    pub fn new(l1: L1, l2: L2, l1_ttl: Duration) -> Self {
        Self { l1, l2, l1_ttl }
    }

    /// Returns a reference to the L1 cache.
    pub fn l1(&self) -> &L1 {
        &self.l1
    }

    /// Returns a reference to the L2 cache.
    pub fn l2(&self) -> &L2 {
        &self.l2
    }
}

#[async_trait]
impl<L1, L2> UrlCache for LayeredCache<L1, L2>
where
    L1: UrlCache,
    L2: UrlCache,
{
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        match self.l1.get_url(code).await {
            Ok(Some(target)) => {
                debug!(code = %code, "L1 cache hit");
                return Ok(Some(target));
            }
            Ok(None) => trace!(code = %code, "L1 cache miss, trying L2"),
            Err(e) => warn!(code = %code, error = %e, "L1 cache error, trying L2"),
        }

        let Some(target) = self.l2.get_url(code).await? else {
            trace!(code = %code, "L2 cache miss");
            return Ok(None);
        };

        debug!(code = %code, "L2 cache hit, backfilling L1");
        if let Err(e) = self.l1.set_url(code, &target, self.l1_ttl).await {
            warn!(code = %code, error = %e, "Failed to backfill L1 cache");
        }
        Ok(Some(target))
    }

    async fn set_url(&self, code: &ShortCode, target: &str, ttl: Duration) -> Result<()> {
        let l2_result = self.l2.set_url(code, target, ttl).await;

        if let Err(e) = self.l1.set_url(code, target, ttl.min(self.l1_ttl)).await {
            warn!(code = %code, error = %e, "Failed to write L1 cache");
        }

        l2_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moka::MokaUrlCache;
    use tether_core::CacheError;

    const HOUR: Duration = Duration::from_secs(3600);

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    /// A cache whose backend is always down.
    #[derive(Debug, Clone, Copy)]
    struct DownCache;

    #[async_trait]
    impl UrlCache for DownCache {
        async fn get_url(&self, _code: &ShortCode) -> Result<Option<String>> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        async fn set_url(&self, _code: &ShortCode, _target: &str, _ttl: Duration) -> Result<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn set_writes_both_layers() {
        let cache = LayeredCache::new(MokaUrlCache::new(), MokaUrlCache::new(), HOUR);
        let c = code("abc123");

        cache.set_url(&c, "https://example.com", HOUR).await.unwrap();

        assert!(cache.l1().get_url(&c).await.unwrap().is_some());
        assert!(cache.l2().get_url(&c).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn l2_hit_backfills_l1() {
        let cache = LayeredCache::new(MokaUrlCache::new(), MokaUrlCache::new(), HOUR);
        let c = code("abc123");
        cache
            .l2()
            .set_url(&c, "https://example.com", HOUR)
            .await
            .unwrap();

        let result = cache.get_url(&c).await.unwrap();

        assert_eq!(result.as_deref(), Some("https://example.com"));
        assert_eq!(
            cache.l1().get_url(&c).await.unwrap().as_deref(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn miss_in_both_layers() {
        let cache = LayeredCache::new(MokaUrlCache::new(), MokaUrlCache::new(), HOUR);

        assert!(cache.get_url(&code("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn l1_failure_falls_through_to_l2() {
        let l2 = MokaUrlCache::new();
        let c = code("abc123");
        l2.set_url(&c, "https://example.com", HOUR).await.unwrap();
        let cache = LayeredCache::new(DownCache, l2, HOUR);

        let result = cache.get_url(&c).await.unwrap();

        assert_eq!(result.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn l2_write_failure_still_fills_l1() {
        let cache = LayeredCache::new(MokaUrlCache::new(), DownCache, HOUR);
        let c = code("abc123");

        let result = cache.set_url(&c, "https://example.com", HOUR).await;

        assert!(matches!(result, Err(CacheError::Unavailable(_))));
        assert!(cache.l1().get_url(&c).await.unwrap().is_some());
    }
}
