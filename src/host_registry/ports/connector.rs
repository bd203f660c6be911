//! Connection factory port for remote agents.

use super::ClientService;
use crate::host_registry::domain::AgentEndpoint;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for agent connection attempts.
pub type AgentConnectResult<T> = Result<T, AgentConnectError>;

/// Establishes new connections to remote agents.
///
/// Implementations own transport concerns, including any per-attempt
/// timeout. A slow `connect` stalls the retry pass that called it.
#[async_trait]
pub trait AgentConnector: Send + Sync {
    /// Credential material presented on every connection attempt.
    type Credentials: Send + Sync;

    /// Connects to `endpoint` and wraps the connection as a client.
    async fn connect(
        &self,
        endpoint: &AgentEndpoint,
        credentials: &Self::Credentials,
    ) -> AgentConnectResult<Arc<dyn ClientService>>;
}

/// Errors returned by agent connector adapters.
#[derive(Debug, Clone, Error)]
pub enum AgentConnectError {
    /// Nothing answered at the endpoint.
    #[error("agent at {0} is unreachable")]
    Unreachable(AgentEndpoint),

    /// The agent refused the presented credentials.
    #[error("agent at {endpoint} rejected credentials: {reason}")]
    CredentialsRejected {
        /// Endpoint that was dialled.
        endpoint: AgentEndpoint,
        /// Reason string.
        reason: String,
    },

    /// Generic runtime failure.
    #[error("agent connector runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl AgentConnectError {
    /// Wraps a runtime error from the connector adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
