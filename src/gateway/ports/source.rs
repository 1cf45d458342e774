//! Operation source port: enumerates the host's callable operations.

use super::Invocable;
use crate::gateway::domain::{NaturalKey, OperationKind, ParameterSource, natural_key};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for operation source calls.
pub type OperationSourceResult<T> = Result<T, OperationSourceError>;

/// Enumerates the operations a host application currently exposes.
///
/// Implementations must be safe to call repeatedly and cheap to
/// re-enumerate; the gateway does its own per-entry caching.
#[async_trait]
pub trait OperationSource: Send + Sync {
    /// Short label used in logs, such as `http` or `graphql`.
    fn label(&self) -> &str;

    /// Lists every operation currently exposed.
    async fn list_operations(&self) -> OperationSourceResult<Vec<RawOperation>>;
}

/// Errors returned by operation sources.
#[derive(Debug, Clone, Error)]
pub enum OperationSourceError {
    /// The source cannot enumerate right now.
    #[error("operation source unavailable: {0}")]
    Unavailable(String),

    /// Generic runtime failure.
    #[error("operation source runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl OperationSourceError {
    /// Wraps a runtime error from the source adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

/// A parameter as reported by the host, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameter {
    /// Name callers use to supply the value.
    pub name: String,
    /// Host-language type name.
    pub origin_type: String,
    /// Where the value comes from.
    pub source: ParameterSource,
    /// Explicit required/optional annotation, when declared.
    pub required: Option<bool>,
}

impl RawParameter {
    /// Creates a parameter with no explicit requiredness.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        origin_type: impl Into<String>,
        source: ParameterSource,
    ) -> Self {
        Self {
            name: name.into(),
            origin_type: origin_type.into(),
            source,
            required: None,
        }
    }

    /// Creates a path parameter.
    #[must_use]
    pub fn path(name: impl Into<String>, origin_type: impl Into<String>) -> Self {
        Self::new(name, origin_type, ParameterSource::Path)
    }

    /// Creates a query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>, origin_type: impl Into<String>) -> Self {
        Self::new(name, origin_type, ParameterSource::Query)
    }

    /// Creates a request body parameter named `body`.
    #[must_use]
    pub fn body(origin_type: impl Into<String>) -> Self {
        Self::new("body", origin_type, ParameterSource::Body)
    }

    /// Creates a GraphQL argument.
    #[must_use]
    pub fn argument(name: impl Into<String>, origin_type: impl Into<String>) -> Self {
        Self::new(name, origin_type, ParameterSource::Argument)
    }

    /// Creates a framework-internal parameter.
    #[must_use]
    pub fn framework_internal(name: impl Into<String>, origin_type: impl Into<String>) -> Self {
        Self::new(name, origin_type, ParameterSource::FrameworkInternal)
    }

    /// Marks the parameter explicitly required or optional.
    #[must_use]
    pub const fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// An operation as reported by the host, before validation.
#[derive(Clone)]
pub struct RawOperation {
    /// How the operation is reached.
    pub kind: OperationKind,
    /// Fully-qualified name of the type declaring the handler.
    pub declaring_type: String,
    /// Handler short name.
    pub handler: String,
    /// Parameters in declaration order.
    pub parameters: Vec<RawParameter>,
    /// Callable target.
    pub target: Arc<dyn Invocable>,
}

impl RawOperation {
    /// Creates an operation with no parameters.
    #[must_use]
    pub fn new(
        kind: OperationKind,
        declaring_type: impl Into<String>,
        handler: impl Into<String>,
        target: Arc<dyn Invocable>,
    ) -> Self {
        Self {
            kind,
            declaring_type: declaring_type.into(),
            handler: handler.into(),
            parameters: Vec::new(),
            target,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: RawParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the base path of an HTTP operation; no-op for GraphQL.
    #[must_use]
    pub fn with_base_path(mut self, base: impl Into<String>) -> Self {
        if let OperationKind::Http { base_path, .. } = &mut self.kind {
            *base_path = base.into();
        }
        self
    }

    /// Returns the stable identity of this operation.
    #[must_use]
    pub fn natural_key(&self) -> NaturalKey {
        natural_key(&self.kind, &self.declaring_type, &self.handler)
    }
}

impl fmt::Debug for RawOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RawOperation")
            .field("kind", &self.kind)
            .field("declaring_type", &self.declaring_type)
            .field("handler", &self.handler)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
