//! Domain model for the capability gateway.
//!
//! Operation and parameter descriptors, portable argument shapes, tool
//! naming and resolution, argument binding, and the execution envelope.
//! Everything here is pure; caching, discovery and invocation live in
//! [`crate::gateway::services`].

pub mod binding;
mod cache_entry;
mod envelope;
mod error;
mod ids;
pub mod naming;
mod operation;
pub mod shape;
mod tool;

pub use binding::{ArgumentError, BindingError, BoundArgument, BoundArguments, bind_arguments};
pub use cache_entry::CacheEntry;
pub use envelope::{ContentItem, ContentType, ErrorCode, ExecutionEnvelope, Fault, ResponseStatus};
pub use error::{GatewayDomainError, ParseHttpMethodError};
pub use ids::{NaturalKey, RequestId};
pub use naming::{generate_tool_name, normalize_tool_name, resolve};
pub use operation::{
    GraphQlOperationType, HttpMethod, OperationDescriptor, OperationKind, ParameterDescriptor,
    ParameterSource, join_paths, natural_key, short_type_name,
};
pub use shape::{InputSchema, ShapeEntry, ShapeKind, derive_parameter_shape};
pub use tool::{Catalog, ToolDescriptor};
