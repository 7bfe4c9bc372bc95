use std::result::Result as StdResult;
use tether_storage::StorageError;
use thiserror::Error;

/// Errors raised while preparing a backing service for a test.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("Container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
    #[error("Could not connect after {attempts} attempts: {source}")]
    Connect {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
    #[error("Schema bootstrap failed: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = StdResult<T, TestInfraError>;
