//! Closure-backed callable targets.

use crate::gateway::domain::BoundArguments;
use crate::gateway::ports::{Invocable, InvocationResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Wraps a synchronous closure as an operation target.
pub struct FnInvocable<F> {
    handler: F,
}

impl<F> FnInvocable<F>
where
    F: Fn(BoundArguments) -> InvocationResult + Send + Sync + 'static,
{
    /// Wraps a closure.
    #[must_use]
    pub const fn new(handler: F) -> Self {
        Self { handler }
    }

    /// Wraps a closure into a shareable target.
    #[must_use]
    pub fn shared(handler: F) -> Arc<dyn Invocable> {
        Arc::new(Self::new(handler))
    }
}

#[async_trait]
impl<F> Invocable for FnInvocable<F>
where
    F: Fn(BoundArguments) -> InvocationResult + Send + Sync + 'static,
{
    async fn invoke(&self, arguments: BoundArguments) -> InvocationResult {
        (self.handler)(arguments)
    }
}

/// Wraps an asynchronous closure as an operation target.
pub struct AsyncFnInvocable<F> {
    handler: F,
}

impl<F, Fut> AsyncFnInvocable<F>
where
    F: Fn(BoundArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InvocationResult> + Send + 'static,
{
    /// Wraps a closure returning a future.
    #[must_use]
    pub const fn new(handler: F) -> Self {
        Self { handler }
    }

    /// Wraps a closure into a shareable target.
    #[must_use]
    pub fn shared(handler: F) -> Arc<dyn Invocable> {
        Arc::new(Self::new(handler))
    }
}

#[async_trait]
impl<F, Fut> Invocable for AsyncFnInvocable<F>
where
    F: Fn(BoundArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InvocationResult> + Send + 'static,
{
    async fn invoke(&self, arguments: BoundArguments) -> InvocationResult {
        (self.handler)(arguments).await
    }
}
