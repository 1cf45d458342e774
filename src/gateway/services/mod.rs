//! Orchestration services for discovery, cataloguing and invocation.

mod controller;
mod discovery;
mod entity_cache;
mod invocation;
mod registry;

pub use controller::{GatewayController, ToolExecutionRequest, ToolsResponse};
pub use discovery::{CapabilityDiscovery, CapabilityDiscoveryError, DiscoveredOperation};
pub use entity_cache::EntityCache;
pub use invocation::InvocationEngine;
pub use registry::{CapabilityRegistry, ResolvedTool};
