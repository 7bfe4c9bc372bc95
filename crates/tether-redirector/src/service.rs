use std::sync::Arc;
use std::time::Duration;

use crate::clicks::{ClickEvent, ClickQueue};
use crate::redirector::Redirector;
use async_trait::async_trait;
use tether_core::{LinkRepository, RedirectorError, ShortCode, UrlCache, DEFAULT_CACHE_TTL};
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Which resolutions count as a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClickPolicy {
    /// Only resolutions answered by the durable store are counted.
    #[default]
    StoreReadsOnly,
    /// Cache hits are counted too, addressed by code.
    EveryResolution,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct RedirectorSettings {
    /// TTL used when repopulating the cache after a store hit.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    #[builder(default)]
    pub click_policy: ClickPolicy,
}

impl Default for RedirectorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Service for resolving short codes.
///
/// Reads are cache-aside: the cache is consulted first and any cache failure
/// counts as a miss. On a store hit the click increment and the cache fill
/// both happen after the response has been produced.
#[derive(Debug)]
pub struct RedirectorService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
    clicks: ClickQueue,
    settings: RedirectorSettings,
}

impl<R, C> Clone for RedirectorService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            clicks: self.clicks.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R: LinkRepository, C: UrlCache> RedirectorService<R, C> {
    pub fn new(
        repository: Arc<R>,
        cache: Arc<C>,
        clicks: ClickQueue,
        settings: RedirectorSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            clicks,
            settings,
        }
    }

    pub fn settings(&self) -> &RedirectorSettings {
        &self.settings
    }

    async fn lookup_cache(&self, code: &ShortCode) -> Option<String> {
        match self.cache.get_url(code).await {
            Ok(Some(target)) => Some(target),
            Ok(None) => {
                trace!(code = %code, "Cache miss");
                None
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Cache lookup failed, falling back to store");
                None
            }
        }
    }

    /// Writes the mapping back into the cache on a detached task.
    fn spawn_cache_fill(&self, code: ShortCode, target: String) {
        let cache = Arc::clone(&self.cache);
        let ttl = self.settings.cache_ttl;

        tokio::spawn(async move {
            match cache.set_url(&code, &target, ttl).await {
                Ok(()) => trace!(code = %code, "Cache repopulated"),
                Err(e) => warn!(code = %code, error = %e, "Failed to repopulate cache"),
            }
        });
    }
}

#[async_trait]
impl<R: LinkRepository, C: UrlCache> Redirector for RedirectorService<R, C> {
    async fn resolve(&self, code: &ShortCode) -> Result<String, RedirectorError> {
        trace!(code = %code, "resolving short code");

        if let Some(target) = self.lookup_cache(code).await {
            debug!(code = %code, "Resolved from cache");
            if self.settings.click_policy == ClickPolicy::EveryResolution {
                self.clicks.record(ClickEvent::Code(code.clone()));
            }
            return Ok(target);
        }

        let Some(record) = self.repository.find_by_code(code).await? else {
            debug!(code = %code, "Short code not found");
            return Err(RedirectorError::NotFound(code.to_string()));
        };

        self.clicks.record(ClickEvent::Record(record.id));
        self.spawn_cache_fill(code.clone(), record.target.clone());

        debug!(code = %code, url = %record.target, "Resolved from store");
        Ok(record.target)
    }
}
