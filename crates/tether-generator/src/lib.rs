//! Short code generators.
//!
//! Generators are pure: they never consult storage. Uniqueness is settled by
//! the durable store's unique key, and the shortener retries on collision.

pub mod token;

pub use token::TokenGenerator;

use tether_core::ShortCode;

/// Trait for generating short codes.
///
/// Every returned code must be a [`ShortCode::Generated`] of six characters.
pub trait Generator: Send + Sync + 'static {
    /// Produces a candidate short code.
    fn generate(&self) -> ShortCode;
}
