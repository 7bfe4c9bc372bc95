//! Fast cache backends for short code → target URL lookups.
//!
//! All backends implement [`UrlCache`]. Entries carry the TTL passed to
//! [`UrlCache::set_url`] and are never explicitly invalidated.

pub mod layered;
pub mod moka;
pub mod noop;
pub mod redis;

pub use layered::LayeredCache;
pub use moka::{MokaCacheConfig, MokaUrlCache};
pub use noop::NoopUrlCache;
pub use redis::RedisUrlCache;
pub use tether_core::cache::{Result, UrlCache};
pub use tether_core::CacheError;
