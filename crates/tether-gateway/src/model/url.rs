use serde::{Deserialize, Serialize};
use tether_core::ShortenedLink;

/// Requests allowed per window. Advertised only, not enforced.
pub const RATE_LIMIT: u32 = 10;
/// Minutes until the advertised rate limit window resets.
pub const RATE_LIMIT_RESET: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub url: String,
    /// Custom alias. Empty means "generate one".
    #[serde(default)]
    pub short: Option<String>,
    /// Requested lifetime in hours.
    #[serde(default)]
    pub expiry: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CreateUrlResponse {
    pub url: String,
    pub short: String,
    pub short_url: String,
    /// Cache lifetime of the mapping, in seconds.
    pub expiry: u64,
    pub rate_limit: u32,
    pub rate_limit_reset: u32,
}

impl CreateUrlResponse {
    pub fn new(link: ShortenedLink, base_url: &str) -> Self {
        Self {
            short_url: link.code.to_url(base_url),
            short: link.code.to_string(),
            url: link.target,
            expiry: link.expiry.as_secs(),
            rate_limit: RATE_LIMIT,
            rate_limit_reset: RATE_LIMIT_RESET,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
