use crate::error::ShortenerError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone, Default)]
pub struct ShortenParams {
    /// The URL to shorten, with or without a scheme.
    pub target: String,
    /// Optional caller-supplied alias.
    pub alias: Option<ShortCode>,
    /// Requested lifetime in hours. Accepted for compatibility, not enforced.
    pub expiry_hours: Option<u64>,
}

impl ShortenParams {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: ShortCode) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn with_expiry_hours(mut self, hours: u64) -> Self {
        self.expiry_hours = Some(hours);
        self
    }
}

/// A newly created short link.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortenedLink {
    pub code: ShortCode,
    /// The normalized target URL.
    pub target: String,
    /// How long the cached mapping lives.
    pub expiry: Duration,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Binds a new short code to the given target URL.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortenedLink>;
}
