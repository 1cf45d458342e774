//! Transport-neutral facade for listing, executing and refreshing tools.

use super::{CapabilityRegistry, InvocationEngine};
use crate::gateway::domain::{
    ErrorCode, ExecutionEnvelope, Fault, RequestId, ResponseStatus, ToolDescriptor,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Body of a tool listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolsResponse {
    /// Tools in catalog order.
    pub tools: Vec<ToolDescriptor>,
}

/// Body of a tool execution request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionRequest {
    /// Tool name or a tolerant spelling of it.
    #[serde(default)]
    pub name: Option<String>,
    /// Arguments keyed by parameter name; must be a JSON object when present.
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl ToolExecutionRequest {
    /// Creates a request for `name` with object arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: Some(name.into()),
            arguments: Some(arguments),
        }
    }
}

/// Entry point a transport layer maps its routes onto.
///
/// `GET /tools` maps to [`Self::list_tools`], `POST /tools/execute` to
/// [`Self::execute`], and `POST /tools/refresh` to [`Self::refresh`].
pub struct GatewayController<C>
where
    C: Clock + Send + Sync,
{
    engine: InvocationEngine<C>,
}

impl<C> GatewayController<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a controller over a registry.
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry<C>>) -> Self {
        Self {
            engine: InvocationEngine::new(registry),
        }
    }

    /// Lists every tool in the current catalog.
    pub async fn list_tools(&self) -> ToolsResponse {
        let catalog = self.engine.registry().get_all().await;
        debug!(tools = catalog.len(), generation = catalog.generation(), "listing tools");
        ToolsResponse {
            tools: catalog.into_tools(),
        }
    }

    /// Executes a tool under a freshly generated request ID.
    ///
    /// Malformed requests are rejected before resolution. A callable that
    /// panics yields an `internal_error` envelope.
    pub async fn execute(
        &self,
        request: ToolExecutionRequest,
    ) -> (ResponseStatus, ExecutionEnvelope) {
        let request_id = RequestId::generate();
        debug!(request_id = %request_id, tool = ?request.name, "execute requested");

        let arguments = match validate(&request) {
            Ok(arguments) => arguments,
            Err(rejection) => {
                warn!(request_id = %request_id, tool = ?request.name, "request validation failed");
                let envelope = ExecutionEnvelope::failure(
                    ErrorCode::ValidationError,
                    request_id,
                    rejection.message,
                    Fault::Client,
                )
                .with_details(rejection.details);
                return (envelope.status(), envelope);
            }
        };

        let envelope = self
            .engine
            .invoke(request.name.as_deref(), arguments.as_ref(), request_id)
            .await;
        (envelope.status(), envelope)
    }

    /// Clears caches and rebuilds the catalog.
    pub async fn refresh(&self) -> (ResponseStatus, ExecutionEnvelope) {
        let catalog = self.engine.registry().refresh().await;
        debug!(tools = catalog.len(), "tools refreshed successfully");
        let envelope =
            ExecutionEnvelope::success(RequestId::generate(), "Tools refreshed successfully");
        (envelope.status(), envelope)
    }
}

struct Rejection {
    message: &'static str,
    details: Value,
}

const NAME_REQUIRED: &str = "Tool name is required";
const ARGUMENTS_NOT_OBJECT: &str = "Arguments must be a JSON object";

fn validate(request: &ToolExecutionRequest) -> Result<Option<Map<String, Value>>, Rejection> {
    let mut violations = Vec::new();
    let mut message = None;
    if request
        .name
        .as_deref()
        .is_none_or(|name| name.trim().is_empty())
    {
        message = Some(NAME_REQUIRED);
        violations.push(json!({
            "field": "name",
            "message": NAME_REQUIRED,
        }));
    }

    let arguments = match &request.arguments {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(other) => {
            message = message.or(Some(ARGUMENTS_NOT_OBJECT));
            violations.push(json!({
                "field": "arguments",
                "message": ARGUMENTS_NOT_OBJECT,
                "rejectedValue": other,
            }));
            None
        }
    };

    match message {
        None => Ok(arguments),
        Some(first) => Err(Rejection {
            message: first,
            details: Value::Array(violations),
        }),
    }
}
