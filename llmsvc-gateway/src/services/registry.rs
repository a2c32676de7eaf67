//! Resource registry: lazy, at-most-once construction of capabilities
//!
//! Handles are keyed by `(task, alias)`. Each key owns a [`OnceCell`]; the
//! first resolver of a key runs the factory while every concurrent resolver
//! of the same key waits on that cell. Different keys never wait on each
//! other. A failed construction leaves the cell empty, so the next resolver
//! tries again.
//!
//! Handles are never dropped once built.

use crate::capabilities::{CapabilityFactory, CapabilityHandle, ModelCatalog, ModelSpec, Task};
use crate::error::GatewayError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{error, info};

type Slot = Arc<OnceCell<CapabilityHandle>>;

/// Memoizing capability factory
pub struct ResourceRegistry {
    catalog: ModelCatalog,
    factory: Arc<dyn CapabilityFactory>,
    slots: Mutex<HashMap<(Task, String), Slot>>,
    constructions: AtomicUsize,
}

impl ResourceRegistry {
    pub fn new(catalog: ModelCatalog, factory: Arc<dyn CapabilityFactory>) -> Self {
        Self {
            catalog,
            factory,
            slots: Mutex::new(HashMap::new()),
            constructions: AtomicUsize::new(0),
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Handle for `task`, using `model` when given and the task default otherwise
    ///
    /// A name outside the task's allow-list fails with `UnknownModel` before
    /// anything is constructed.
    pub async fn resolve(&self, task: Task, model: Option<&str>) -> Result<CapabilityHandle, GatewayError> {
        let alias = model.unwrap_or_else(|| self.catalog.default_alias(task));

        let spec = self
            .catalog
            .lookup(task, alias)
            .ok_or_else(|| GatewayError::UnknownModel {
                task,
                requested: alias.to_string(),
                valid: self.catalog.supported_names(task),
            })?;

        self.get_or_construct(spec).await
    }

    /// Construct the default capability of every required task
    ///
    /// Any failure here means the service cannot start.
    pub async fn prewarm(&self) -> Result<(), GatewayError> {
        for task in Task::ALL.into_iter().filter(Task::is_required) {
            let handle = self.resolve(task, None).await.map_err(|e| {
                error!(task = %task, error = %e, "Failed to pre-warm capability");
                e
            })?;
            info!(task = %task, model = %handle.model_name(), "Capability ready");
        }
        Ok(())
    }

    /// Number of capabilities successfully constructed so far
    pub fn constructed(&self) -> usize {
        self.constructions.load(Ordering::Relaxed)
    }

    async fn get_or_construct(&self, spec: ModelSpec) -> Result<CapabilityHandle, GatewayError> {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(
                slots
                    .entry((spec.task, spec.alias.clone()))
                    .or_insert_with(|| Arc::new(OnceCell::new())),
            )
        };

        let handle = slot
            .get_or_try_init(|| async {
                info!(task = %spec.task, model = %spec.alias, upstream = %spec.upstream_id, "Loading capability");
                let handle = self.factory.load(&spec).await?;
                self.constructions.fetch_add(1, Ordering::Relaxed);
                Ok::<_, GatewayError>(handle)
            })
            .await?;

        Ok(Arc::clone(handle))
    }
}
