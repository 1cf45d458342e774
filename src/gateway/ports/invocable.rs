//! Callable contract for discovered operations.

use crate::gateway::domain::{ArgumentError, BoundArguments};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Result type for operation invocations.
pub type InvocationResult = Result<Value, InvocationError>;

/// A callable operation target owned by the host application.
#[async_trait]
pub trait Invocable: Send + Sync {
    /// Invokes the operation with bound arguments.
    async fn invoke(&self, arguments: BoundArguments) -> InvocationResult;
}

/// Errors raised by a callable itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvocationError {
    /// The callable refused the caller's input.
    #[error("{0}")]
    Rejected(String),

    /// The callable failed while running.
    #[error("{0}")]
    Failed(String),

    /// The callable's result could not be encoded.
    #[error("result could not be serialized: {0}")]
    Serialization(String),
}

impl InvocationError {
    /// Creates a rejection caused by caller input.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates a failure raised by the callable.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<ArgumentError> for InvocationError {
    fn from(err: ArgumentError) -> Self {
        Self::Rejected(err.to_string())
    }
}

/// Encodes a callable's typed result as JSON.
///
/// # Errors
///
/// Returns [`InvocationError::Serialization`] when `T` cannot be represented
/// as JSON, for example a map with non-string keys.
pub fn encode_result<T: Serialize>(result: &T) -> InvocationResult {
    serde_json::to_value(result).map_err(|err| InvocationError::Serialization(err.to_string()))
}
