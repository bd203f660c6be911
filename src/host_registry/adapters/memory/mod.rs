//! Deterministic in-memory adapters for clients and agent connections.

mod client;
mod connector;

pub use client::StaticClientService;
pub use connector::InMemoryAgentConnector;
