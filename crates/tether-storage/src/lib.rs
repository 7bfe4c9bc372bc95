//! Durable link stores for Tether.
//!
//! [`MySqlRepository`] is the production store; [`InMemoryRepository`] backs
//! single-process deployments and tests.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use tether_core::repository::{LinkId, LinkRecord, LinkRepository, NewLink, Result};
pub use tether_core::StorageError;
