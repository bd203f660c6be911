//! Client capability port for a connected docker host.

use crate::host_registry::domain::Host;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for client service operations.
pub type ClientServiceResult<T> = Result<T, ClientServiceError>;

/// Handle to a connected docker host, local or remote.
///
/// The registry only ever asks a client for its host metadata; every other
/// capability of a concrete client is invisible to it.
#[async_trait]
pub trait ClientService: Send + Sync {
    /// Fetches the current host metadata.
    async fn host(&self) -> ClientServiceResult<Host>;
}

/// Errors returned by client service adapters.
#[derive(Debug, Clone, Error)]
pub enum ClientServiceError {
    /// The host did not answer.
    #[error("docker host is unreachable: {0}")]
    Unreachable(String),

    /// The host answered but refused the request.
    #[error("docker host rejected the request: {0}")]
    Rejected(String),

    /// Generic runtime failure.
    #[error("client runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ClientServiceError {
    /// Wraps a runtime error from the client adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
