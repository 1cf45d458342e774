//! In-memory operation source backed by a declarative route table.

use crate::gateway::{
    domain::NaturalKey,
    ports::{OperationSource, OperationSourceError, OperationSourceResult, RawOperation},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Operation source whose operations are registered explicitly.
///
/// Suitable for static registration in hosts without runtime reflection
/// and for tests that add and remove operations between discovery passes.
#[derive(Debug, Clone)]
pub struct InMemoryOperationSource {
    label: String,
    state: Arc<RwLock<InMemorySourceState>>,
    enumerations: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
struct InMemorySourceState {
    operations: Vec<RawOperation>,
    unavailable: Option<String>,
}

fn lock_error(err: impl ToString) -> OperationSourceError {
    OperationSourceError::runtime(std::io::Error::other(err.to_string()))
}

impl InMemoryOperationSource {
    /// Creates an empty source with a log label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: Arc::new(RwLock::new(InMemorySourceState::default())),
            enumerations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Registers an operation, replacing any with the same natural key.
    ///
    /// # Errors
    ///
    /// Returns source runtime errors when lock acquisition fails.
    pub fn register(&self, operation: RawOperation) -> OperationSourceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let key = operation.natural_key();
        state
            .operations
            .retain(|existing| existing.natural_key() != key);
        state.operations.push(operation);
        Ok(())
    }

    /// Removes the operation with the given natural key.
    ///
    /// Returns whether an operation was removed.
    ///
    /// # Errors
    ///
    /// Returns source runtime errors when lock acquisition fails.
    pub fn remove(&self, key: &NaturalKey) -> OperationSourceResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        let before = state.operations.len();
        state
            .operations
            .retain(|existing| existing.natural_key() != *key);
        Ok(state.operations.len() != before)
    }

    /// Makes subsequent listings fail with a diagnostic, or restores them.
    ///
    /// # Errors
    ///
    /// Returns source runtime errors when lock acquisition fails.
    pub fn set_unavailable(&self, reason: Option<String>) -> OperationSourceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.unavailable = reason;
        Ok(())
    }

    /// Returns how many times the source has been enumerated.
    #[must_use]
    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OperationSource for InMemoryOperationSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn list_operations(&self) -> OperationSourceResult<Vec<RawOperation>> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().map_err(lock_error)?;
        if let Some(reason) = &state.unavailable {
            return Err(OperationSourceError::Unavailable(reason.clone()));
        }
        Ok(state.operations.clone())
    }
}
