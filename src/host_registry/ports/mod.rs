//! Port contracts for host metadata queries and agent connections.

mod client;
mod connector;

pub use client::{ClientService, ClientServiceError, ClientServiceResult};
pub use connector::{AgentConnectError, AgentConnectResult, AgentConnector};
