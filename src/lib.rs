//! Toolgate: a capability gateway for host applications.
//!
//! Toolgate discovers the operations a host application exposes (HTTP
//! handlers, GraphQL resolvers), publishes them as a catalog of named tools
//! with JSON input schemas, and executes them by name with JSON arguments,
//! wrapping every outcome in a uniform envelope.
//!
//! # Architecture
//!
//! Toolgate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure values and functions with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the host's operations
//! - **Adapters**: Concrete implementations of ports
//! - **Services**: Discovery, caching, cataloguing and invocation
//!
//! # Modules
//!
//! - [`config`]: Gateway configuration
//! - [`gateway`]: Discovery, catalog and invocation

pub mod config;
pub mod gateway;
