//! Registry of live host clients with retry of unreachable agents.
//!
//! [`HostRegistry`] owns the clients keyed by host identity and the agent
//! endpoints still waiting for a first successful connection. A retry pass
//! holds the write lock for its whole duration, connection attempts
//! included, so readers wait until every pending endpoint has been tried.

use super::subscriptions::{SubscriberSet, SubscriptionScope};
use crate::host_registry::{
    domain::{AgentEndpoint, Host, HostId},
    ports::{AgentConnectError, AgentConnector, ClientService, ClientServiceError},
};
use futures::future::join_all;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

/// Failure to bring a single agent endpoint online.
#[derive(Debug, Clone, Error)]
pub enum EndpointRetryError {
    /// The connector could not establish a connection.
    #[error("failed to connect to agent {endpoint}: {source}")]
    Connect {
        /// Endpoint that was dialled.
        endpoint: AgentEndpoint,
        /// Connector failure.
        #[source]
        source: AgentConnectError,
    },

    /// The connection succeeded but the agent did not report its host.
    #[error("failed to fetch host info from agent {endpoint}: {source}")]
    HostInfo {
        /// Endpoint that was dialled.
        endpoint: AgentEndpoint,
        /// Client failure.
        #[source]
        source: ClientServiceError,
    },
}

impl EndpointRetryError {
    /// Returns the endpoint that failed.
    #[must_use]
    pub const fn endpoint(&self) -> &AgentEndpoint {
        match self {
            Self::Connect { endpoint, .. } | Self::HostInfo { endpoint, .. } => endpoint,
        }
    }
}

/// Outcome of a retry pass: the live clients and the failures of this pass.
pub struct RetryReport {
    clients: Vec<Arc<dyn ClientService>>,
    errors: Vec<EndpointRetryError>,
}

impl RetryReport {
    const fn new(clients: Vec<Arc<dyn ClientService>>, errors: Vec<EndpointRetryError>) -> Self {
        Self { clients, errors }
    }

    /// Returns every live client after the pass.
    #[must_use]
    pub fn clients(&self) -> &[Arc<dyn ClientService>] {
        &self.clients
    }

    /// Returns the failures encountered during the pass.
    #[must_use]
    pub fn errors(&self) -> &[EndpointRetryError] {
        &self.errors
    }

    /// Splits the report into clients and errors.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Arc<dyn ClientService>>, Vec<EndpointRetryError>) {
        (self.clients, self.errors)
    }
}

impl fmt::Debug for RetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryReport")
            .field("clients", &self.clients.len())
            .field("errors", &self.errors)
            .finish()
    }
}

/// Point-in-time counts of live clients and pending endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySummary {
    /// Number of live clients.
    pub clients: usize,
    /// Number of endpoints waiting for a retry.
    pub pending_endpoints: usize,
}

impl fmt::Display for RegistrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HostRegistry{{clients: {}, pending_endpoints: {}}}",
            self.clients, self.pending_endpoints
        )
    }
}

#[derive(Clone)]
struct RegisteredClient {
    host: Host,
    client: Arc<dyn ClientService>,
}

#[derive(Default)]
struct RegistryState {
    clients: HashMap<HostId, RegisteredClient>,
    pending: Vec<AgentEndpoint>,
}

impl RegistryState {
    /// Stores a client unless its identity is already taken.
    fn insert_first_wins(&mut self, host: Host, client: Arc<dyn ClientService>) {
        match self.clients.entry(host.id().clone()) {
            Entry::Occupied(_) => {
                warn!(host = %host.id(), "duplicate client found for host; keeping the first");
            }
            Entry::Vacant(slot) => {
                slot.insert(RegisteredClient { host, client });
            }
        }
    }

    fn remove_pending(&mut self, endpoint: &AgentEndpoint) {
        if let Some(position) = self.pending.iter().position(|queued| queued == endpoint) {
            self.pending.remove(position);
        }
    }
}

/// Live registry of docker host clients.
///
/// Construction never fails: agents that cannot be reached are kept pending
/// and retried by [`HostRegistry::retry_and_list`].
pub struct HostRegistry<K>
where
    K: AgentConnector,
{
    state: RwLock<RegistryState>,
    connector: Arc<K>,
    credentials: K::Credentials,
    subscribers: SubscriberSet,
}

impl<K> HostRegistry<K>
where
    K: AgentConnector,
{
    /// Builds the registry from pre-built clients and agent endpoints.
    ///
    /// A pre-built client whose host query fails is skipped, not retried.
    /// An endpoint that cannot be connected or queried is kept pending.
    /// When two clients report the same identity the first one processed is
    /// kept and the later one is discarded.
    pub async fn new(
        endpoints: Vec<AgentEndpoint>,
        connector: Arc<K>,
        credentials: K::Credentials,
        initial_clients: Vec<Arc<dyn ClientService>>,
    ) -> Self {
        debug!(
            clients = initial_clients.len(),
            agents = endpoints.len(),
            "creating host registry"
        );

        let mut state = RegistryState::default();
        for client in initial_clients {
            match client.host().await {
                Ok(host) => state.insert_first_wins(host, client),
                Err(err) => {
                    warn!(error = %err, "failed to fetch host info for client; skipping");
                }
            }
        }

        for endpoint in endpoints {
            match connect_agent(&*connector, &endpoint, &credentials).await {
                Ok((host, client)) => state.insert_first_wins(host, client),
                Err(err) => {
                    warn!(endpoint = %endpoint, error = %err, "agent unavailable; queued for retry");
                    state.pending.push(endpoint);
                }
            }
        }

        Self {
            state: RwLock::new(state),
            connector,
            credentials,
            subscribers: SubscriberSet::new(),
        }
    }

    /// Registers `channel` to receive hosts that become available.
    ///
    /// The subscription lasts until `scope` is cancelled. Subscribing again
    /// with the same scope replaces the channel. Must be called from within
    /// a Tokio runtime.
    pub fn subscribe(&self, scope: SubscriptionScope, channel: mpsc::Sender<Host>) {
        self.subscribers.subscribe(scope, channel);
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Retries every pending endpoint once, then lists the live clients.
    ///
    /// Endpoints are tried in pending order. A promoted agent replaces any
    /// client already stored under its identity and is announced to every
    /// subscriber as available. Failed endpoints stay pending for the next
    /// pass.
    pub async fn retry_and_list(&self) -> RetryReport {
        let mut errors = Vec::new();
        {
            let mut state = self.state.write().await;
            let attempts = state.pending.clone();
            for endpoint in attempts {
                match connect_agent(&*self.connector, &endpoint, &self.credentials).await {
                    Ok((host, client)) => {
                        // Live and pending stay disjoint even if this pass is dropped.
                        state.remove_pending(&endpoint);
                        let event = host.clone().with_availability(true);
                        if state
                            .clients
                            .insert(host.id().clone(), RegisteredClient { host, client })
                            .is_some()
                        {
                            debug!(host = %event.id(), "replaced existing client for host");
                        }
                        let notified = self.subscribers.broadcast(&event);
                        info!(
                            endpoint = %endpoint,
                            host = %event.id(),
                            subscribers = notified,
                            "agent is now available"
                        );
                    }
                    Err(err) => {
                        warn!(endpoint = %endpoint, error = %err, "agent retry failed");
                        errors.push(err);
                    }
                }
            }
        }

        RetryReport::new(self.list().await, errors)
    }

    /// Returns a snapshot of every live client.
    pub async fn list(&self) -> Vec<Arc<dyn ClientService>> {
        let state = self.state.read().await;
        state
            .clients
            .values()
            .map(|entry| Arc::clone(&entry.client))
            .collect()
    }

    /// Returns the client registered for `id`, if any.
    pub async fn find(&self, id: &HostId) -> Option<Arc<dyn ClientService>> {
        let state = self.state.read().await;
        state.clients.get(id).map(|entry| Arc::clone(&entry.client))
    }

    /// Reports every known host with its current availability.
    ///
    /// Live clients are queried concurrently; a client that fails to answer
    /// is reported with its last known metadata and marked unavailable.
    /// Each pending endpoint contributes an unavailable agent placeholder.
    pub async fn hosts(&self) -> Vec<Host> {
        let (entries, pending) = {
            let state = self.state.read().await;
            let entries: Vec<RegisteredClient> = state.clients.values().cloned().collect();
            (entries, state.pending.clone())
        };

        let mut hosts = join_all(entries.into_iter().map(|entry| async move {
            match entry.client.host().await {
                Ok(host) => host.with_availability(true),
                Err(err) => {
                    debug!(host = %entry.host.id(), error = %err, "host query failed");
                    entry.host.with_availability(false)
                }
            }
        }))
        .await;

        hosts.extend(pending.iter().map(Host::unreachable_agent));
        hosts
    }

    /// Returns the endpoints waiting for a retry, in retry order.
    pub async fn pending_endpoints(&self) -> Vec<AgentEndpoint> {
        self.state.read().await.pending.clone()
    }

    /// Returns the counts of live clients and pending endpoints.
    pub async fn summary(&self) -> RegistrySummary {
        let state = self.state.read().await;
        RegistrySummary {
            clients: state.clients.len(),
            pending_endpoints: state.pending.len(),
        }
    }
}

async fn connect_agent<K>(
    connector: &K,
    endpoint: &AgentEndpoint,
    credentials: &K::Credentials,
) -> Result<(Host, Arc<dyn ClientService>), EndpointRetryError>
where
    K: AgentConnector,
{
    let client = connector
        .connect(endpoint, credentials)
        .await
        .map_err(|source| EndpointRetryError::Connect {
            endpoint: endpoint.clone(),
            source,
        })?;

    let host = client
        .host()
        .await
        .map_err(|source| EndpointRetryError::HostInfo {
            endpoint: endpoint.clone(),
            source,
        })?;

    Ok((host, client))
}
