//! Core types and traits for the Tether URL shortener.
//!
//! This crate provides the shared data model, the collaborator contracts
//! (durable link store and fast URL cache) and the error taxonomy used by
//! both the shortener (creation) and redirector (resolution) services.

pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use cache::UrlCache;
pub use error::{CacheError, RedirectorError, ShortenerError, StorageError};
pub use repository::{LinkId, LinkRecord, LinkRepository, NewLink};
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, ShortenedLink, Shortener};

use std::time::Duration;

/// Fixed time-to-live applied to cache entries when nothing else is configured.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
