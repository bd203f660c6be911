//! Scripted client service backed by shared in-memory state.

use crate::host_registry::{
    domain::{Host, HostId, HostKind},
    ports::{ClientService, ClientServiceError, ClientServiceResult},
};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

/// Client service that reports a fixed host and can be made unreachable.
///
/// Clones share state, so a test can keep one handle while the registry owns
/// another and flip reachability between queries.
#[derive(Debug, Clone)]
pub struct StaticClientService {
    state: Arc<RwLock<StaticClientState>>,
}

#[derive(Debug)]
struct StaticClientState {
    host: Host,
    failure: Option<String>,
    queries: usize,
}

impl StaticClientService {
    /// Creates a reachable client reporting `host`.
    #[must_use]
    pub fn new(host: Host) -> Self {
        Self {
            state: Arc::new(RwLock::new(StaticClientState {
                host,
                failure: None,
                queries: 0,
            })),
        }
    }

    /// Creates a reachable client for the local docker daemon.
    #[must_use]
    pub fn local(id: HostId, name: impl Into<String>) -> Self {
        Self::new(Host::new(id, name, "local", HostKind::Local))
    }

    /// Makes subsequent queries fail with `message`.
    ///
    /// # Errors
    ///
    /// Returns client runtime errors when lock acquisition fails.
    pub fn set_unreachable(&self, message: impl Into<String>) -> ClientServiceResult<()> {
        let mut state = self.write_state()?;
        state.failure = Some(message.into().trim().to_owned());
        Ok(())
    }

    /// Makes subsequent queries succeed again.
    ///
    /// # Errors
    ///
    /// Returns client runtime errors when lock acquisition fails.
    pub fn set_reachable(&self) -> ClientServiceResult<()> {
        let mut state = self.write_state()?;
        state.failure = None;
        Ok(())
    }

    /// Returns how many times the host metadata was requested.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).queries
    }

    fn write_state(&self) -> ClientServiceResult<RwLockWriteGuard<'_, StaticClientState>> {
        self.state
            .write()
            .map_err(|err| ClientServiceError::runtime(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl ClientService for StaticClientService {
    async fn host(&self) -> ClientServiceResult<Host> {
        let mut state = self.write_state()?;
        state.queries += 1;

        if let Some(message) = &state.failure {
            return Err(ClientServiceError::Unreachable(message.clone()));
        }

        Ok(state.host.clone())
    }
}
