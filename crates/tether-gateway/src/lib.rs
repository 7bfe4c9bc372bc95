//! HTTP boundary for the Tether URL shortener.
//!
//! Exposes link creation (`POST /api/v1`), redirection (`GET /{code}`) and a
//! health probe on top of any [`Shortener`](tether_core::Shortener) and
//! [`Redirector`](tether_redirector::Redirector).

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::AppError;
pub use state::AppState;
