//! Capability gateway: exposes a host's operations as callable tools.
//!
//! Operations reported by one or more [`ports::OperationSource`]s are
//! discovered, cached per entry with a TTL, turned into a catalog of
//! [`domain::ToolDescriptor`]s, and invoked by name with JSON arguments.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
