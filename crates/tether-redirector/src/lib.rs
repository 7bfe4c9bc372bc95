//! Short code resolution with cache-aside reads and asynchronous click
//! accounting.
//!
//! [`RedirectorService`] answers from the [`UrlCache`](tether_core::UrlCache)
//! when it can and falls back to the durable
//! [`LinkRepository`](tether_core::LinkRepository) otherwise. A store hit
//! repopulates the cache and enqueues a click on the [`ClickQueue`], both off
//! the request path.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tether_cache::MokaUrlCache;
//! use tether_core::ShortCode;
//! use tether_redirector::{ClickQueue, Redirector, RedirectorService, RedirectorSettings};
//! use tether_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(InMemoryRepository::new());
//! let (clicks, worker) = ClickQueue::spawn(Arc::clone(&repository), 1024);
//! let service = RedirectorService::new(
//!     repository,
//!     Arc::new(MokaUrlCache::new()),
//!     clicks,
//!     RedirectorSettings::default(),
//! );
//!
//! let target = service.resolve(&ShortCode::new("abc123")?).await?;
//! println!("Redirect to: {target}");
//!
//! drop(service);
//! worker.drain(std::time::Duration::from_secs(5)).await;
//! # Ok(())
//! # }
//! ```

pub mod clicks;
pub mod redirector;
pub mod service;

pub use clicks::{ClickEvent, ClickQueue, ClickWorker};
pub use redirector::Redirector;
pub use service::{ClickPolicy, RedirectorService, RedirectorSettings};
pub use tether_core::RedirectorError;
