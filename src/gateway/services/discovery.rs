//! Per-source operation discovery with TTL-reconciled caching.

use super::EntityCache;
use crate::gateway::{
    domain::{GatewayDomainError, NaturalKey, OperationDescriptor, ParameterDescriptor},
    ports::{OperationSource, OperationSourceError, RawOperation},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that fail a whole discovery pass.
#[derive(Debug, Clone, Error)]
pub enum CapabilityDiscoveryError {
    /// The operation source could not enumerate.
    #[error("discovery from source `{label}` failed: {source}")]
    Source {
        /// Label of the failing source.
        label: String,
        /// Underlying source error.
        #[source]
        source: OperationSourceError,
    },
}

/// An operation descriptor together with the time it was computed.
#[derive(Debug, Clone)]
pub struct DiscoveredOperation {
    descriptor: Arc<OperationDescriptor>,
    computed_at: DateTime<Utc>,
}

impl DiscoveredOperation {
    /// Returns the validated operation.
    #[must_use]
    pub const fn descriptor(&self) -> &Arc<OperationDescriptor> {
        &self.descriptor
    }

    /// Returns when the descriptor was computed.
    ///
    /// Equal timestamps for the same natural key mean the same computation.
    #[must_use]
    pub const fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }
}

/// Discovers the operations of one source, reusing unexpired descriptors.
pub struct CapabilityDiscovery<C>
where
    C: Clock + Send + Sync,
{
    source: Arc<dyn OperationSource>,
    cache: EntityCache<NaturalKey, Arc<OperationDescriptor>>,
    ttl: Duration,
    clock: Arc<C>,
}

impl<C> CapabilityDiscovery<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a discovery over `source` with a per-entry TTL.
    #[must_use]
    pub fn new(source: Arc<dyn OperationSource>, ttl: Duration, clock: Arc<C>) -> Self {
        Self {
            source,
            cache: EntityCache::new(),
            ttl,
            clock,
        }
    }

    /// Returns the label of the underlying source.
    #[must_use]
    pub fn label(&self) -> &str {
        self.source.label()
    }

    /// Returns the descriptor cache.
    #[must_use]
    pub const fn cache(&self) -> &EntityCache<NaturalKey, Arc<OperationDescriptor>> {
        &self.cache
    }

    /// Reconciles the cache with the source and returns current operations.
    ///
    /// Operations that vanished from the source are evicted. Entries younger
    /// than the TTL are reused; the rest are recomputed and stamped with the
    /// current time. Operations that fail validation are skipped. The result
    /// is ordered by natural key.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDiscoveryError::Source`] when the source cannot
    /// enumerate. The cache is left untouched in that case.
    pub async fn discover(&self) -> Result<Vec<DiscoveredOperation>, CapabilityDiscoveryError> {
        let raw_operations =
            self.source
                .list_operations()
                .await
                .map_err(|source| CapabilityDiscoveryError::Source {
                    label: self.label().to_owned(),
                    source,
                })?;

        let keyed: Vec<(NaturalKey, RawOperation)> = raw_operations
            .into_iter()
            .map(|raw| (raw.natural_key(), raw))
            .collect();
        let current: HashSet<NaturalKey> = keyed.iter().map(|(key, _)| key.clone()).collect();
        let evicted = self.cache.retain_only(&current);

        let now = self.clock.utc();
        let mut seen = HashSet::with_capacity(keyed.len());
        let mut reused = 0_usize;
        let mut discovered = Vec::with_capacity(keyed.len());
        for (key, raw) in keyed {
            if !seen.insert(key.clone()) {
                warn!(source = self.label(), key = %key, "duplicate operation ignored");
                continue;
            }

            if let Some(entry) = self.cache.get_fresh(&key, self.ttl, now) {
                reused += 1;
                discovered.push(DiscoveredOperation {
                    computed_at: entry.cached_at(),
                    descriptor: entry.into_value(),
                });
                continue;
            }

            match describe(raw) {
                Ok(computed) => {
                    let descriptor = Arc::new(computed);
                    self.cache.put(key, Arc::clone(&descriptor), now);
                    discovered.push(DiscoveredOperation {
                        descriptor,
                        computed_at: now,
                    });
                }
                Err(err) => {
                    self.cache.remove(&key);
                    warn!(source = self.label(), key = %key, error = %err, "operation skipped");
                }
            }
        }

        discovered.sort_by(|left, right| left.descriptor.key().cmp(right.descriptor.key()));
        debug!(
            source = self.label(),
            total = discovered.len(),
            reused,
            evicted,
            "discovery pass complete"
        );
        Ok(discovered)
    }

    /// Drops every cached descriptor.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn describe(raw: RawOperation) -> Result<OperationDescriptor, GatewayDomainError> {
    let RawOperation {
        kind,
        declaring_type,
        handler,
        parameters: raw_parameters,
        target,
    } = raw;
    let parameters = raw_parameters
        .into_iter()
        .map(|parameter| {
            ParameterDescriptor::new(
                parameter.name,
                parameter.origin_type,
                parameter.source,
                parameter.required,
            )
        })
        .collect();
    OperationDescriptor::new(kind, declaring_type, handler, parameters, target)
}
