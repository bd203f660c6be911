//! Dockhand: live registry of docker hosts reached locally or through agents.
//!
//! This crate tracks which docker hosts are currently connected, retries
//! agents that could not be reached, and notifies observers in real time
//! when a previously unreachable agent becomes available.
//!
//! # Architecture
//!
//! Dockhand follows hexagonal architecture principles:
//!
//! - **Domain**: Host identity and availability values
//! - **Ports**: Abstract trait interfaces for host clients and agent
//!   connections
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`host_registry`]: Client registry, retry passes and subscriber fan-out

pub mod host_registry;
