//! Adapter implementations for host registry ports.

pub mod memory;
