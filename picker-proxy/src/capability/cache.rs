//! Caching decorator for capability loaders.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use super::traits::{CapabilityLoader, PickerFactory};
use crate::error::LoadError;

type ModuleKey = (String, String);

/// Loads each `(endpoint, module_id)` pair at most once and shares the result.
///
/// Concurrent first requests for the same pair wait on a single inner
/// acquisition. Failures are not cached, so a later request tries again.
pub struct CachedLoader<L> {
    inner: L,
    factories: DashMap<ModuleKey, Arc<OnceCell<Arc<dyn PickerFactory>>>>,
}

impl<L: CapabilityLoader> CachedLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            factories: DashMap::new(),
        }
    }

    /// The wrapped loader.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Number of pairs with a loaded factory.
    pub fn cached_count(&self) -> usize {
        self.factories
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// Forget the factory for a pair. Returns whether one was cached.
    pub fn invalidate(&self, endpoint: &str, module_id: &str) -> bool {
        self.factories
            .remove(&(endpoint.to_string(), module_id.to_string()))
            .map(|(_, cell)| cell.initialized())
            .unwrap_or(false)
    }
}

#[async_trait]
impl<L: CapabilityLoader> CapabilityLoader for CachedLoader<L> {
    async fn acquire(
        &self,
        endpoint: &str,
        module_id: &str,
    ) -> Result<Arc<dyn PickerFactory>, LoadError> {
        // Clone the cell out so the map shard is not locked across the await.
        let cell = self
            .factories
            .entry((endpoint.to_string(), module_id.to_string()))
            .or_default()
            .clone();

        if cell.initialized() {
            debug!(endpoint, module_id, "Module cache hit");
        }

        cell.get_or_try_init(|| self.inner.acquire(endpoint, module_id))
            .await
            .cloned()
    }
}
