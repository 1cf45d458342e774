//! Resolves, binds, invokes and wraps tool executions.

use super::CapabilityRegistry;
use crate::gateway::{
    domain::{ErrorCode, ExecutionEnvelope, Fault, RequestId, bind_arguments},
    ports::InvocationError,
};
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Executes catalog tools and reports every outcome as an envelope.
///
/// Every failure, including a callable that panics, becomes an error
/// envelope carrying the request ID.
pub struct InvocationEngine<C>
where
    C: Clock + Send + Sync,
{
    registry: Arc<CapabilityRegistry<C>>,
}

impl<C> Clone for InvocationEngine<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<C> InvocationEngine<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an engine over a registry.
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry<C>>) -> Self {
        Self { registry }
    }

    /// Returns the registry the engine resolves against.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CapabilityRegistry<C>> {
        &self.registry
    }

    /// Invokes the tool matching `tool_name` with `arguments`.
    ///
    /// The callable runs on its own task so a panic surfaces as an
    /// `internal_error` envelope.
    pub async fn invoke(
        &self,
        tool_name: Option<&str>,
        arguments: Option<&Map<String, Value>>,
        request_id: RequestId,
    ) -> ExecutionEnvelope {
        let Some(name) = tool_name.map(str::trim).filter(|name| !name.is_empty()) else {
            return ExecutionEnvelope::failure(
                ErrorCode::ValidationError,
                request_id,
                "Tool name is required",
                Fault::Client,
            );
        };

        let Some(resolved) = self.registry.resolve_operation(Some(name)).await else {
            warn!(request_id = %request_id, tool = name, "tool not found");
            return ExecutionEnvelope::failure(
                ErrorCode::ToolNotFound,
                request_id,
                format!("Tool not found: {name}"),
                Fault::Client,
            );
        };
        let resolved_name = resolved.tool().name();
        let operation = resolved.operation();
        debug!(request_id = %request_id, query = name, tool = resolved_name, "invoking tool");

        let bound = match bind_arguments(operation.parameters(), arguments) {
            Ok(bound) => bound,
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    tool = resolved_name,
                    error = %err,
                    "argument binding failed"
                );
                return ExecutionEnvelope::failure(
                    ErrorCode::SerializationError,
                    request_id,
                    "Error processing arguments",
                    Fault::Client,
                )
                .with_details(err.details());
            }
        };

        let target = Arc::clone(operation.target());
        let result = match tokio::spawn(async move { target.invoke(bound).await }).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => return failure_envelope(resolved_name, request_id, &err),
            Err(err) => {
                error!(
                    request_id = %request_id,
                    tool = resolved_name,
                    error = %err,
                    "tool execution aborted"
                );
                return ExecutionEnvelope::failure(
                    ErrorCode::InternalError,
                    request_id,
                    "Internal error occurred",
                    Fault::Server,
                );
            }
        };

        match serde_json::to_string(&result) {
            Ok(text) => {
                debug!(request_id = %request_id, tool = resolved_name, "tool succeeded");
                ExecutionEnvelope::success(request_id, text)
            }
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    tool = resolved_name,
                    error = %err,
                    "result encoding failed"
                );
                ExecutionEnvelope::failure(
                    ErrorCode::SerializationError,
                    request_id,
                    "Error processing result",
                    Fault::Server,
                )
            }
        }
    }
}

fn failure_envelope(
    tool_name: &str,
    request_id: RequestId,
    err: &InvocationError,
) -> ExecutionEnvelope {
    warn!(request_id = %request_id, tool = tool_name, error = %err, "tool failed");
    match err {
        InvocationError::Rejected(message) => ExecutionEnvelope::failure(
            ErrorCode::ExecutionError,
            request_id,
            format!("Error executing tool: {message}"),
            Fault::Client,
        ),
        InvocationError::Failed(message) => ExecutionEnvelope::failure(
            ErrorCode::ExecutionError,
            request_id,
            format!("Error executing tool: {message}"),
            Fault::Server,
        ),
        InvocationError::Serialization(_) => ExecutionEnvelope::failure(
            ErrorCode::SerializationError,
            request_id,
            "Error processing result",
            Fault::Server,
        ),
    }
}
