//! Unit tests for the transport-facing controller.

use super::support::{ManualClock, clock, echo, get_user, registry_over, source};
use crate::gateway::{
    adapters::{FnInvocable, memory::InMemoryOperationSource},
    domain::{ErrorCode, HttpMethod, OperationKind, ResponseStatus},
    ports::RawOperation,
    services::{GatewayController, ToolExecutionRequest},
};
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

fn controller_over(
    source: &InMemoryOperationSource,
    clock: &Arc<ManualClock>,
) -> GatewayController<ManualClock> {
    GatewayController::new(registry_over(&[source], clock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_tools_returns_catalog(source: InMemoryOperationSource, clock: Arc<ManualClock>) {
    source.register(get_user()).expect("register should succeed");
    source.register(echo()).expect("register should succeed");
    let controller = controller_over(&source, &clock);

    let response = controller.list_tools().await;
    let body = serde_json::to_value(&response).expect("response should encode");

    assert_eq!(response.tools.len(), 2);
    let tools = body.get("tools").and_then(Value::as_array).expect("tools array");
    assert!(tools.iter().all(|tool| tool.get("inputSchema").is_some()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn execute_generates_request_ids(source: InMemoryOperationSource, clock: Arc<ManualClock>) {
    source.register(echo()).expect("register should succeed");
    let controller = controller_over(&source, &clock);
    let request = ToolExecutionRequest::new("post_api_echo_echo", json!({ "name": "John" }));

    let (first_status, first) = controller.execute(request.clone()).await;
    let (_, second) = controller.execute(request).await;

    assert_eq!(first_status, ResponseStatus::Ok);
    assert_eq!(first.request_id().as_str().len(), 36);
    assert_ne!(first.request_id(), second.request_id());
}

#[rstest]
#[case(ToolExecutionRequest::default(), "Tool name is required", "name")]
#[case(
    ToolExecutionRequest { name: Some("  ".to_owned()), arguments: None },
    "Tool name is required",
    "name"
)]
#[case(
    ToolExecutionRequest::new("post_api_echo_echo", json!(["John"])),
    "Arguments must be a JSON object",
    "arguments"
)]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_requests_are_rejected(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
    #[case] request: ToolExecutionRequest,
    #[case] message: &str,
    #[case] field: &str,
) {
    source.register(echo()).expect("register should succeed");
    let controller = controller_over(&source, &clock);

    let (status, envelope) = controller.execute(request).await;

    assert_eq!(status, ResponseStatus::BadRequest);
    assert_eq!(envelope.error_code(), Some(ErrorCode::ValidationError));
    assert_eq!(envelope.text(), Some(message));
    let first = envelope
        .details()
        .and_then(|details| details.get(0))
        .expect("details should list the violation");
    assert_eq!(first.get("field"), Some(&json!(field)));
    assert_eq!(source.enumerations(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn null_arguments_count_as_none(source: InMemoryOperationSource, clock: Arc<ManualClock>) {
    source.register(echo()).expect("register should succeed");
    let controller = controller_over(&source, &clock);
    let request: ToolExecutionRequest =
        serde_json::from_str(r#"{"name": "echo", "arguments": null}"#).expect("body should parse");

    let (status, envelope) = controller.execute(request).await;

    assert_eq!(status, ResponseStatus::BadRequest);
    assert_eq!(envelope.error_code(), Some(ErrorCode::ExecutionError));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn panicking_callable_is_an_internal_error(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    let exploding = RawOperation::new(
        OperationKind::http(HttpMethod::Post, "/api/explode"),
        "app::ChaosController",
        "explode",
        FnInvocable::shared(|_| panic!("callable exploded")),
    );
    source.register(exploding).expect("register should succeed");
    let controller = controller_over(&source, &clock);

    let (status, envelope) = controller
        .execute(ToolExecutionRequest::new("explode", json!({})))
        .await;

    assert_eq!(status, ResponseStatus::InternalServerError);
    assert_eq!(envelope.error_code(), Some(ErrorCode::InternalError));
    assert_eq!(envelope.text(), Some("Internal error occurred"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_confirms_and_rebuilds(source: InMemoryOperationSource, clock: Arc<ManualClock>) {
    source.register(get_user()).expect("register should succeed");
    let controller = controller_over(&source, &clock);
    assert_eq!(controller.list_tools().await.tools.len(), 1);

    source.register(echo()).expect("register should succeed");
    let (status, envelope) = controller.refresh().await;

    assert_eq!(status, ResponseStatus::Ok);
    assert!(envelope.text().is_some_and(|text| text.contains("refreshed")));
    assert_eq!(controller.list_tools().await.tools.len(), 2);
}
