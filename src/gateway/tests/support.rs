//! Shared fixtures for gateway service tests.

use crate::config::GatewayConfig;
use crate::gateway::{
    adapters::{FnInvocable, memory::InMemoryOperationSource},
    domain::{HttpMethod, OperationKind},
    ports::{InvocationError, RawOperation, RawParameter},
    services::CapabilityRegistry,
};
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use parking_lot::Mutex;
use rstest::fixture;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const TTL: Duration = Duration::from_secs(300);

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).expect("duration should fit");
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

pub type TestRegistry = CapabilityRegistry<ManualClock>;

#[fixture]
pub fn clock() -> Arc<ManualClock> {
    let start = DateTime::from_timestamp(1_700_000_000, 0).expect("timestamp should be valid");
    Arc::new(ManualClock::starting_at(start))
}

#[fixture]
pub fn source() -> InMemoryOperationSource {
    InMemoryOperationSource::new("http")
}

pub fn registry_over(
    sources: &[&InMemoryOperationSource],
    clock: &Arc<ManualClock>,
) -> Arc<TestRegistry> {
    let config = GatewayConfig::default().with_cache_ttl(TTL);
    let registry = sources.iter().fold(
        CapabilityRegistry::new(&config, Arc::clone(clock)),
        |registry, source| registry.with_source(Arc::new((*source).clone())),
    );
    Arc::new(registry)
}

pub fn get_user() -> RawOperation {
    RawOperation::new(
        OperationKind::http(HttpMethod::Get, "/{id}"),
        "app::UserController",
        "getUser",
        FnInvocable::shared(|arguments| {
            let id: i64 = arguments.required("id")?;
            Ok(json!({ "id": id, "name": "Ada" }))
        }),
    )
    .with_base_path("/api/users")
    .with_parameter(RawParameter::path("id", "i64"))
}

pub fn echo() -> RawOperation {
    RawOperation::new(
        OperationKind::http(HttpMethod::Post, "/api/echo"),
        "app::EchoController",
        "echo",
        FnInvocable::shared(|arguments| {
            let name: String = arguments.required("name")?;
            Ok(json!({ "name": name }))
        }),
    )
    .with_parameter(RawParameter::query("name", "String"))
}

pub fn failing() -> RawOperation {
    RawOperation::new(
        OperationKind::http(HttpMethod::Delete, "/api/jobs/{id}"),
        "app::JobController",
        "cancelJob",
        FnInvocable::shared(|_| Err(InvocationError::failed("job runner offline"))),
    )
    .with_parameter(RawParameter::path("id", "i64"))
}

pub fn status(path: &str, handler: &str) -> RawOperation {
    RawOperation::new(
        OperationKind::http(HttpMethod::Get, path),
        "app::StatusController",
        handler,
        FnInvocable::shared(|_| Ok(json!("up"))),
    )
}
