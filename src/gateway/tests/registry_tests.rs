//! Unit tests for catalog building, publication and refresh.

use super::support::{
    ManualClock, TestRegistry, clock, echo, get_user, registry_over, source, status,
};
use crate::gateway::{
    adapters::{FnInvocable, memory::InMemoryOperationSource},
    domain::{BoundArguments, GraphQlOperationType, HttpMethod, NaturalKey, OperationKind},
    ports::{RawOperation, RawParameter},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const GET_USER: &str = "get_api_users_id_getUser";
const A_B_FETCH: &str = "get_api_a_b_fetch";

fn user_by_id() -> RawOperation {
    RawOperation::new(
        OperationKind::graphql(GraphQlOperationType::Query, "userById"),
        "com.example.UserResolver",
        "userById",
        FnInvocable::shared(|_| Ok(Value::Null)),
    )
    .with_parameter(RawParameter::argument("id", "Long").with_required(true))
}

fn alpha() -> RawOperation {
    RawOperation::new(
        OperationKind::http(HttpMethod::Get, "/api/a-b"),
        "app::AlphaController",
        "fetch",
        FnInvocable::shared(|_| Ok(json!("alpha"))),
    )
}

fn beta() -> RawOperation {
    RawOperation::new(
        OperationKind::http(HttpMethod::Get, "/api/a_b"),
        "app::BetaController",
        "fetch",
        FnInvocable::shared(|_| Ok(json!("beta"))),
    )
}

async fn key_of(registry: &TestRegistry, name: &str) -> NaturalKey {
    registry
        .resolve_operation(Some(name))
        .await
        .expect("tool should resolve")
        .operation()
        .key()
        .clone()
}

fn tool_stamps(registry: &TestRegistry, key: &NaturalKey) -> (DateTime<Utc>, DateTime<Utc>) {
    let entry = registry.tool_cache().get(key).expect("tool should be cached");
    (entry.cached_at(), entry.value().computed_at)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn catalog_is_built_once_and_reused(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);

    let first = registry.get_all().await;
    let second = registry.get_all().await;

    assert_eq!(first.generation(), 1);
    assert_eq!(first, second);
    assert_eq!(source.enumerations(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_readers_share_one_build(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(get_user()).expect("register should succeed");
    source.register(echo()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let shared = Arc::clone(&registry);
            tokio::spawn(async move { shared.get_all().await.generation() })
        })
        .collect();
    for reader in readers {
        assert_eq!(reader.await.expect("reader should finish"), 1);
    }
    assert_eq!(source.enumerations(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_picks_up_new_operations(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);
    let before = registry.get_all().await;

    source.register(echo()).expect("register should succeed");
    assert_eq!(registry.get_all().await.len(), before.len());

    let refreshed = registry.refresh().await;
    let after = registry.get_all().await;

    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(refreshed, after);
    assert!(after.generation() > before.generation());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tools_carry_names_descriptions_and_schemas(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(get_user()).expect("register should succeed");
    source.register(user_by_id()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);

    let user = registry
        .find_by_name(Some(GET_USER))
        .await
        .expect("http tool should exist");
    assert_eq!(
        user.description(),
        "Calls GET /api/users/{id} (Controller: UserController, Method: getUser)"
    );
    assert_eq!(
        serde_json::to_value(user.input_schema()).expect("schema should encode"),
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer", "originType": "i64", "nullable": false }
            },
            "required": ["id"]
        })
    );

    let resolver = registry
        .find_by_name(Some("graphql_query_userById"))
        .await
        .expect("graphql tool should exist");
    assert_eq!(
        resolver.description(),
        "Calls GraphQL QUERY 'userById' (Controller: UserResolver, Method: userById)"
    );
    let id = resolver.input_schema().property("id").expect("id should be described");
    assert_eq!(id.graphql_type(), Some("Long"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_by_name_tolerates_drift(source: InMemoryOperationSource, clock: Arc<ManualClock>) {
    source.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);

    let found = registry.find_by_name(Some("getuser")).await;
    assert_eq!(
        found.map(|tool| tool.name().to_owned()).as_deref(),
        Some(GET_USER)
    );
    assert!(registry.find_by_name(Some("")).await.is_none());
    assert!(registry.find_by_name(None).await.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn colliding_names_are_disambiguated(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(beta()).expect("register should succeed");
    source.register(alpha()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);

    let catalog = registry.get_all().await;
    let names: Vec<&str> = catalog.tools().iter().map(|tool| tool.name()).collect();

    assert_eq!(names.len(), 2);
    assert_eq!(names.first(), Some(&A_B_FETCH));
    let renamed = names.get(1).expect("second tool should exist");
    assert!(renamed.starts_with("get_api_a_b_fetch_"));
    assert_eq!(renamed.len(), "get_api_a_b_fetch_".len() + 8);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn published_names_survive_a_later_collision(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(beta()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);
    let before = registry.get_all().await;
    assert_eq!(before.tools().first().map(|tool| tool.name()), Some(A_B_FETCH));

    source.register(alpha()).expect("register should succeed");
    let after = registry.refresh().await;

    let held = registry
        .resolve_operation(Some(A_B_FETCH))
        .await
        .expect("original name should still resolve");
    assert_eq!(held.operation().declaring_type(), "app::BetaController");
    let result = held.operation().target().invoke(BoundArguments::default()).await;
    assert_eq!(result, Ok(json!("beta")));

    let names: Vec<&str> = after.tools().iter().map(|tool| tool.name()).collect();
    assert_eq!(names.len(), 2);
    let newcomer = names
        .iter()
        .find(|name| **name != A_B_FETCH)
        .expect("newcomer should be listed");
    assert!(newcomer.starts_with("get_api_a_b_fetch_"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn operation_listed_by_two_sources_appears_once(clock: Arc<ManualClock>) {
    let primary = InMemoryOperationSource::new("primary");
    let mirror = InMemoryOperationSource::new("mirror");
    primary.register(get_user()).expect("register should succeed");
    mirror.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&primary, &mirror], &clock);

    let catalog = registry.get_all().await;
    let names: Vec<&str> = catalog.tools().iter().map(|tool| tool.name()).collect();

    assert_eq!(names, [GET_USER]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn derived_tools_are_reused_within_ttl(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);
    registry.get_all().await;
    let key = key_of(&registry, GET_USER).await;
    let first_built = clock.utc();

    clock.advance(Duration::from_secs(100));
    registry.invalidate();
    registry.get_all().await;

    assert_eq!(tool_stamps(&registry, &key), (first_built, first_built));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn derived_tools_expire_with_ttl(source: InMemoryOperationSource, clock: Arc<ManualClock>) {
    source.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);
    registry.get_all().await;
    let key = key_of(&registry, GET_USER).await;

    clock.advance(Duration::from_secs(301));
    registry.invalidate();
    registry.get_all().await;

    let now = clock.utc();
    assert_eq!(tool_stamps(&registry, &key), (now, now));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn derived_tools_follow_a_recomputed_descriptor(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);
    registry.get_all().await;
    let key = key_of(&registry, GET_USER).await;

    clock.advance(Duration::from_secs(10));
    registry.discoveries().first().expect("one discovery").clear_cache();
    registry.invalidate();
    registry.get_all().await;

    let now = clock.utc();
    let descriptor = registry
        .discoveries()
        .first()
        .expect("one discovery")
        .cache()
        .get(&key)
        .expect("descriptor should be cached");
    assert_eq!(descriptor.cached_at(), now);
    assert_eq!(tool_stamps(&registry, &key), (now, now));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_recomputes_derived_tools(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);
    registry.get_all().await;
    let key = key_of(&registry, GET_USER).await;

    clock.advance(Duration::from_secs(10));
    registry.refresh().await;

    let now = clock.utc();
    assert_eq!(tool_stamps(&registry, &key), (now, now));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sources_contribute_in_registration_order(clock: Arc<ManualClock>) {
    let http = InMemoryOperationSource::new("http");
    let graphql = InMemoryOperationSource::new("graphql");
    http.register(get_user()).expect("register should succeed");
    graphql.register(user_by_id()).expect("register should succeed");
    let registry = registry_over(&[&graphql, &http], &clock);

    let catalog = registry.get_all().await;
    let names: Vec<&str> = catalog.tools().iter().map(|tool| tool.name()).collect();

    assert_eq!(names, ["graphql_query_userById", "get_api_users_id_getUser"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_source_contributes_nothing(clock: Arc<ManualClock>) {
    let http = InMemoryOperationSource::new("http");
    let graphql = InMemoryOperationSource::new("graphql");
    http.register(get_user()).expect("register should succeed");
    graphql.register(user_by_id()).expect("register should succeed");
    graphql
        .set_unavailable(Some("schema not loaded".to_owned()))
        .expect("update should succeed");
    let registry = registry_over(&[&http, &graphql], &clock);

    let catalog = registry.get_all().await;

    assert_eq!(catalog.len(), 1);
    assert!(registry.find_by_name(Some("graphql_query_userById")).await.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalidate_rebuilds_from_warm_caches(
    source: InMemoryOperationSource,
    clock: Arc<ManualClock>,
) {
    source.register(get_user()).expect("register should succeed");
    source.register(status("/health", "health")).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);
    let before = registry.get_all().await;

    registry.invalidate();
    let after = registry.get_all().await;

    assert_eq!(after.generation(), before.generation() + 1);
    assert_eq!(after.tools(), before.tools());
    let discovery = registry.discoveries().first().expect("one discovery");
    assert_eq!(discovery.cache().len(), 2);
    assert_eq!(source.enumerations(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_clears_caches(source: InMemoryOperationSource, clock: Arc<ManualClock>) {
    source.register(get_user()).expect("register should succeed");
    let registry = registry_over(&[&source], &clock);
    registry.get_all().await;
    assert_eq!(registry.tool_cache().len(), 1);

    registry.shutdown().await;

    let discovery = registry.discoveries().first().expect("one discovery");
    assert!(discovery.cache().is_empty());
    assert!(registry.tool_cache().is_empty());
    assert_eq!(registry.get_all().await.len(), 1);
}
