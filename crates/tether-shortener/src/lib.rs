//! Link creation service.
//!
//! [`ShortenerService`] normalizes the target, guards against links to the
//! service itself, picks a code (caller alias or generated), persists the
//! record and writes it through to the cache. Core types are re-exported
//! from `tether_core`.

pub mod service;
pub mod target;

pub use service::{ShortenerService, ShortenerSettings};
pub use target::SelfReferenceGuard;
pub use tether_core::{ShortenParams, ShortenedLink, Shortener, ShortenerError};
