//! In-memory agent connector with scripted reachability.

use super::StaticClientService;
use crate::host_registry::{
    domain::{AgentEndpoint, Host},
    ports::{AgentConnectError, AgentConnectResult, AgentConnector, ClientService},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Agent connector that dials a table of scripted agents.
///
/// Endpoints with no online agent fail with
/// [`AgentConnectError::Unreachable`]. When a required token is set, any
/// other credential fails with [`AgentConnectError::CredentialsRejected`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentConnector {
    state: Arc<RwLock<InMemoryConnectorState>>,
    required_token: Option<String>,
    connect_delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct InMemoryConnectorState {
    online: HashMap<AgentEndpoint, StaticClientService>,
    attempts: HashMap<AgentEndpoint, usize>,
}

impl InMemoryAgentConnector {
    /// Creates a connector with no agents online.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires every connection attempt to present `token`.
    #[must_use]
    pub fn with_required_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    /// Delays every connection attempt by `delay`.
    #[must_use]
    pub const fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Puts an agent reporting `host` online at `endpoint`.
    ///
    /// Returns the client handed out on connect so callers can script its
    /// later reachability. An agent already online there is replaced.
    ///
    /// # Errors
    ///
    /// Returns connector runtime errors when lock acquisition fails.
    pub fn bring_online(
        &self,
        endpoint: AgentEndpoint,
        host: Host,
    ) -> AgentConnectResult<StaticClientService> {
        let client = StaticClientService::new(host);
        let mut state = self
            .state
            .write()
            .map_err(|err| AgentConnectError::runtime(std::io::Error::other(err.to_string())))?;
        state.online.insert(endpoint, client.clone());
        Ok(client)
    }

    /// Takes the agent at `endpoint` offline for future connection attempts.
    ///
    /// # Errors
    ///
    /// Returns connector runtime errors when lock acquisition fails.
    pub fn take_offline(&self, endpoint: &AgentEndpoint) -> AgentConnectResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| AgentConnectError::runtime(std::io::Error::other(err.to_string())))?;
        state.online.remove(endpoint);
        Ok(())
    }

    /// Returns how many connection attempts were made to `endpoint`.
    #[must_use]
    pub fn attempts(&self, endpoint: &AgentEndpoint) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.attempts.get(endpoint).copied().unwrap_or_default()
    }
}

#[async_trait]
impl AgentConnector for InMemoryAgentConnector {
    type Credentials = String;

    async fn connect(
        &self,
        endpoint: &AgentEndpoint,
        credentials: &Self::Credentials,
    ) -> AgentConnectResult<Arc<dyn ClientService>> {
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self
            .state
            .write()
            .map_err(|err| AgentConnectError::runtime(std::io::Error::other(err.to_string())))?;
        *state.attempts.entry(endpoint.clone()).or_default() += 1;

        if let Some(required) = &self.required_token
            && required != credentials
        {
            return Err(AgentConnectError::CredentialsRejected {
                endpoint: endpoint.clone(),
                reason: "token mismatch".to_owned(),
            });
        }

        let client = state
            .online
            .get(endpoint)
            .cloned()
            .ok_or_else(|| AgentConnectError::Unreachable(endpoint.clone()))?;
        Ok(Arc::new(client))
    }
}
