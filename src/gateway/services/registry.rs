//! Lazily built, atomically published tool catalog.

use super::{CapabilityDiscovery, DiscoveredOperation, EntityCache};
use crate::config::GatewayConfig;
use crate::gateway::{
    domain::{
        Catalog, GatewayDomainError, InputSchema, NaturalKey, OperationDescriptor, OperationKind,
        ToolDescriptor, generate_tool_name,
        naming::{assign_unique_names, resolve_by},
    },
    ports::OperationSource,
};
use chrono::{DateTime, Utc};
use minijinja::{Environment, context};
use mockable::Clock;
use parking_lot::{Mutex as SyncMutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const HTTP_DESCRIPTION: &str =
    "Calls {{ verb }} {{ locator }} (Controller: {{ controller }}, Method: {{ handler }})";
const GRAPHQL_DESCRIPTION: &str =
    "Calls GraphQL {{ verb }} '{{ locator }}' (Controller: {{ controller }}, Method: {{ handler }})";

#[derive(Debug, Error)]
enum ToolBuildError {
    #[error("description template failed: {0}")]
    Template(#[from] minijinja::Error),
    #[error(transparent)]
    Domain(#[from] GatewayDomainError),
}

/// A catalog tool paired with the operation it calls.
#[derive(Debug, Clone)]
pub struct ResolvedTool {
    tool: ToolDescriptor,
    operation: Arc<OperationDescriptor>,
}

impl ResolvedTool {
    /// Returns the tool as listed in the catalog.
    #[must_use]
    pub const fn tool(&self) -> &ToolDescriptor {
        &self.tool
    }

    /// Returns the operation behind the tool.
    #[must_use]
    pub const fn operation(&self) -> &Arc<OperationDescriptor> {
        &self.operation
    }
}

/// A derived tool and the discovery computation it came from.
#[derive(Debug, Clone)]
pub(crate) struct CachedTool {
    pub(crate) tool: ToolDescriptor,
    pub(crate) computed_at: DateTime<Utc>,
}

#[derive(Debug)]
struct PublishedCatalog {
    catalog: Catalog,
    entries: Vec<ResolvedTool>,
}

/// Aggregates discoveries into a catalog of tools.
///
/// The catalog is built on first read and published behind a single
/// reference swap. Readers never wait on a build once a catalog exists;
/// builds and refreshes are serialized by one async mutex.
pub struct CapabilityRegistry<C>
where
    C: Clock + Send + Sync,
{
    discoveries: Vec<CapabilityDiscovery<C>>,
    tool_cache: EntityCache<NaturalKey, CachedTool>,
    ttl: Duration,
    clock: Arc<C>,
    templates: Environment<'static>,
    published: RwLock<Option<Arc<PublishedCatalog>>>,
    assigned_names: SyncMutex<HashMap<NaturalKey, String>>,
    build_lock: Mutex<()>,
    generation: AtomicU64,
}

impl<C> CapabilityRegistry<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a registry with no sources.
    #[must_use]
    pub fn new(config: &GatewayConfig, clock: Arc<C>) -> Self {
        Self {
            discoveries: Vec::new(),
            tool_cache: EntityCache::new(),
            ttl: config.cache_ttl(),
            clock,
            templates: Environment::new(),
            published: RwLock::new(None),
            assigned_names: SyncMutex::new(HashMap::new()),
            build_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Adds an operation source with its own descriptor cache.
    ///
    /// Sources contribute tools in the order they are added.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn OperationSource>) -> Self {
        self.discoveries.push(CapabilityDiscovery::new(
            source,
            self.ttl,
            Arc::clone(&self.clock),
        ));
        self
    }

    /// Returns the per-source discoveries in registration order.
    #[must_use]
    pub fn discoveries(&self) -> &[CapabilityDiscovery<C>] {
        &self.discoveries
    }

    pub(crate) const fn tool_cache(&self) -> &EntityCache<NaturalKey, CachedTool> {
        &self.tool_cache
    }

    /// Returns a copy of the current catalog, building it if needed.
    pub async fn get_all(&self) -> Catalog {
        self.published().await.catalog.clone()
    }

    /// Resolves `query` against the current catalog.
    pub async fn find_by_name(&self, query: Option<&str>) -> Option<ToolDescriptor> {
        self.resolve_operation(query)
            .await
            .map(|resolved| resolved.tool)
    }

    /// Resolves `query` to a tool and its operation.
    pub async fn resolve_operation(&self, query: Option<&str>) -> Option<ResolvedTool> {
        let published = self.published().await;
        resolve_by(query, &published.entries, |entry| entry.tool.name()).cloned()
    }

    /// Clears every cache and rebuilds the catalog before returning.
    ///
    /// Tool names assigned by earlier builds are kept. Concurrent readers
    /// keep seeing the previous catalog until the new one is published.
    pub async fn refresh(&self) -> Catalog {
        let _guard = self.build_lock.lock().await;
        self.clear_caches();
        let rebuilt = Arc::new(self.build().await);
        *self.published.write() = Some(Arc::clone(&rebuilt));
        info!(
            generation = rebuilt.catalog.generation(),
            tools = rebuilt.catalog.len(),
            "tool catalog refreshed"
        );
        rebuilt.catalog.clone()
    }

    /// Discards the published catalog; the next read rebuilds it.
    ///
    /// Entity caches are kept, so unexpired descriptors are reused.
    pub fn invalidate(&self) {
        *self.published.write() = None;
        debug!("tool catalog invalidated");
    }

    /// Clears every cache, the published catalog and remembered tool names.
    pub async fn shutdown(&self) {
        let _guard = self.build_lock.lock().await;
        self.clear_caches();
        self.assigned_names.lock().clear();
        *self.published.write() = None;
        info!("capability registry shut down");
    }

    fn current(&self) -> Option<Arc<PublishedCatalog>> {
        self.published.read().clone()
    }

    async fn published(&self) -> Arc<PublishedCatalog> {
        if let Some(published) = self.current() {
            return published;
        }

        let _guard = self.build_lock.lock().await;
        if let Some(published) = self.current() {
            return published;
        }

        let built = Arc::new(self.build().await);
        *self.published.write() = Some(Arc::clone(&built));
        built
    }

    fn clear_caches(&self) {
        for discovery in &self.discoveries {
            discovery.clear_cache();
        }
        self.tool_cache.clear();
    }

    async fn build(&self) -> PublishedCatalog {
        let mut operations = Vec::new();
        let mut seen = HashSet::new();
        for discovery in &self.discoveries {
            match discovery.discover().await {
                Ok(discovered) => {
                    for found in discovered {
                        let key = found.descriptor().key();
                        if seen.insert(key.clone()) {
                            operations.push(found);
                        } else {
                            warn!(
                                source = discovery.label(),
                                key = %key,
                                "operation already provided by another source"
                            );
                        }
                    }
                }
                Err(err) => warn!(source = discovery.label(), error = %err, "source skipped"),
            }
        }
        self.tool_cache.retain_only(&seen);

        let now = self.clock.utc();
        let candidates: Vec<(ToolDescriptor, Arc<OperationDescriptor>)> = operations
            .iter()
            .filter_map(|discovered| {
                self.tool_for(discovered, now)
                    .map(|tool| (tool, Arc::clone(discovered.descriptor())))
            })
            .collect();

        let previous = self.assigned_names.lock().clone();
        let requested: Vec<(&str, &NaturalKey)> = candidates
            .iter()
            .map(|(tool, operation)| (tool.name(), operation.key()))
            .collect();
        let names = assign_unique_names(&requested, &previous);

        let mut assigned = HashMap::with_capacity(names.len());
        let mut entries = Vec::with_capacity(names.len());
        for ((candidate, operation), name) in candidates.into_iter().zip(names) {
            let tool = if name == candidate.name() {
                candidate
            } else {
                warn!(
                    name = candidate.name(),
                    key = %operation.key(),
                    renamed = %name,
                    "tool name collision"
                );
                candidate.renamed(name)
            };
            assigned.insert(operation.key().clone(), tool.name().to_owned());
            entries.push(ResolvedTool { tool, operation });
        }
        *self.assigned_names.lock() = assigned;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        let tools = entries.iter().map(|entry| entry.tool.clone()).collect();
        debug!(generation, tools = entries.len(), "tool catalog built");
        PublishedCatalog {
            catalog: Catalog::new(generation, tools),
            entries,
        }
    }

    fn tool_for(
        &self,
        discovered: &DiscoveredOperation,
        now: DateTime<Utc>,
    ) -> Option<ToolDescriptor> {
        let operation = discovered.descriptor();
        let key = operation.key();
        let cached = self
            .tool_cache
            .get_fresh(key, self.ttl, now)
            .filter(|entry| entry.value().computed_at == discovered.computed_at());
        if let Some(entry) = cached {
            return Some(entry.into_value().tool);
        }

        match self.describe(operation) {
            Ok(tool) => {
                self.tool_cache.put(
                    key.clone(),
                    CachedTool {
                        tool: tool.clone(),
                        computed_at: discovered.computed_at(),
                    },
                    now,
                );
                Some(tool)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "tool skipped");
                None
            }
        }
    }

    fn describe(&self, operation: &OperationDescriptor) -> Result<ToolDescriptor, ToolBuildError> {
        let template = match operation.kind() {
            OperationKind::Http { .. } => HTTP_DESCRIPTION,
            OperationKind::GraphQl { .. } => GRAPHQL_DESCRIPTION,
        };
        let description = self.templates.render_str(
            template,
            context! {
                verb => operation.kind().verb(),
                locator => operation.kind().locator(),
                controller => operation.declaring_type_short_name(),
                handler => operation.handler(),
            },
        )?;
        Ok(ToolDescriptor::new(
            generate_tool_name(operation),
            description,
            InputSchema::from_parameters(operation.parameters()),
        )?)
    }
}
