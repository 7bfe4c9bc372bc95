use crate::target::{self, SelfReferenceGuard};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tether_core::{
    LinkRecord, LinkRepository, NewLink, ShortCode, ShortenParams, ShortenedLink, Shortener,
    ShortenerError, StorageError, UrlCache, DEFAULT_CACHE_TTL,
};
use tether_generator::Generator;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// The service's own public domain, used by the self-reference guard.
    /// Empty disables the guard.
    #[builder(default, setter(into))]
    pub public_domain: String,
    /// TTL for write-through cache entries, also reported as the link expiry.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    /// Total insert attempts for a generated code before giving up.
    #[builder(default = 3)]
    pub max_generate_attempts: u32,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The link creation service.
///
/// Writes go to the durable store first, then to the cache (write-through).
/// The store's unique key decides code ownership: the alias existence
/// pre-check only produces a faster error in the common case, and a racing
/// creation still observes `Conflict` from the insert itself.
#[derive(Debug)]
pub struct ShortenerService<R, C, G> {
    repository: Arc<R>,
    cache: Arc<C>,
    generator: Arc<G>,
    guard: SelfReferenceGuard,
    settings: ShortenerSettings,
}

impl<R, C, G> Clone for ShortenerService<R, C, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            guard: self.guard.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R: LinkRepository, C: UrlCache, G: Generator> ShortenerService<R, C, G> {
    pub fn new(
        repository: Arc<R>,
        cache: Arc<C>,
        generator: Arc<G>,
        settings: ShortenerSettings,
    ) -> Self {
        let guard = SelfReferenceGuard::new(&settings.public_domain);
        Self {
            repository,
            cache,
            generator,
            guard,
            settings,
        }
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    async fn insert_alias(
        &self,
        alias: ShortCode,
        target: String,
    ) -> Result<(ShortCode, LinkRecord), ShortenerError> {
        if self.repository.exists(&alias).await? {
            debug!(code = %alias, "Alias already in use");
            return Err(ShortenerError::Conflict(alias.to_string()));
        }

        let record = self
            .repository
            .insert(NewLink::new(alias.clone(), target))
            .await?;
        Ok((alias, record))
    }

    async fn insert_generated(
        &self,
        target: String,
    ) -> Result<(ShortCode, LinkRecord), ShortenerError> {
        let attempts = self.settings.max_generate_attempts.max(1);
        let mut last_code = String::new();

        for attempt in 1..=attempts {
            let code = self.generator.generate();
            match self
                .repository
                .insert(NewLink::new(code.clone(), target.clone()))
                .await
            {
                Ok(record) => return Ok((code, record)),
                Err(StorageError::Conflict(_)) => {
                    warn!(code = %code, attempt, attempts, "Generated short code collided");
                    last_code = code.to_string();
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ShortenerError::Conflict(last_code))
    }

    async fn write_through(&self, code: &ShortCode, target: &str) {
        if let Err(e) = self
            .cache
            .set_url(code, target, self.settings.cache_ttl)
            .await
        {
            warn!(code = %code, error = %e, "Write-through cache update failed");
        }
    }
}

#[async_trait]
impl<R: LinkRepository, C: UrlCache, G: Generator> Shortener for ShortenerService<R, C, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<ShortenedLink, ShortenerError> {
        let target = target::normalize(&params.target)?;
        self.guard.check(&target)?;

        if let Some(hours) = params.expiry_hours {
            trace!(expiry_hours = hours, "Expiry hint is not enforced on records");
        }

        let (code, record) = match params.alias {
            Some(alias) => self.insert_alias(alias, target).await?,
            None => self.insert_generated(target).await?,
        };

        self.write_through(&code, &record.target).await;

        info!(
            code = %code,
            id = record.id,
            generated = record.is_generated,
            "Created short link"
        );
        Ok(ShortenedLink {
            code,
            target: record.target,
            expiry: self.settings.cache_ttl,
        })
    }
}
