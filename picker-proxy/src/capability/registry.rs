//! In-process module registry acting as a capability loader.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::traits::{CapabilityLoader, PickerFactory};
use crate::error::LoadError;

/// A registered module.
#[derive(Clone)]
struct ModuleEntry {
    factory: Arc<dyn PickerFactory>,
    metadata: ModuleMetadata,
}

/// Metadata about a registered module.
#[derive(Debug, Clone)]
pub struct ModuleMetadata {
    /// Whether this module can currently be acquired
    pub enabled: bool,
    /// How many times the module was acquired
    pub acquisitions: u64,
}

impl Default for ModuleMetadata {
    fn default() -> Self {
        Self {
            enabled: true,
            acquisitions: 0,
        }
    }
}

/// Registry of factories keyed by module id.
///
/// Serves every endpoint from the same table, which makes it the loader of
/// choice for embedded pickers and for tests.
pub struct ModuleRegistry {
    modules: Arc<RwLock<HashMap<String, ModuleEntry>>>,
}

impl ModuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            modules: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a factory, replacing any previous one under the same id.
    pub async fn register(&self, module_id: impl Into<String>, factory: Arc<dyn PickerFactory>) {
        let mut modules = self.modules.write().await;
        modules.insert(
            module_id.into(),
            ModuleEntry {
                factory,
                metadata: ModuleMetadata::default(),
            },
        );
    }

    /// Check if a module is registered.
    pub async fn has(&self, module_id: &str) -> bool {
        let modules = self.modules.read().await;
        modules.contains_key(module_id)
    }

    /// Check if a module is registered and enabled.
    pub async fn is_available(&self, module_id: &str) -> bool {
        let modules = self.modules.read().await;
        modules
            .get(module_id)
            .map(|m| m.metadata.enabled)
            .unwrap_or(false)
    }

    /// Enable or disable a module.
    pub async fn set_enabled(&self, module_id: &str, enabled: bool) {
        let mut modules = self.modules.write().await;
        if let Some(m) = modules.get_mut(module_id) {
            m.metadata.enabled = enabled;
        }
    }

    /// Get metadata for a module.
    pub async fn get_metadata(&self, module_id: &str) -> Option<ModuleMetadata> {
        let modules = self.modules.read().await;
        modules.get(module_id).map(|m| m.metadata.clone())
    }

    /// All registered module ids.
    pub async fn modules(&self) -> Vec<String> {
        let modules = self.modules.read().await;
        modules.keys().cloned().collect()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityLoader for ModuleRegistry {
    async fn acquire(
        &self,
        endpoint: &str,
        module_id: &str,
    ) -> Result<Arc<dyn PickerFactory>, LoadError> {
        if endpoint.trim().is_empty() {
            return Err(LoadError::InvalidEndpoint("empty endpoint".to_string()));
        }

        let mut modules = self.modules.write().await;
        let entry = modules
            .get_mut(module_id)
            .ok_or_else(|| LoadError::ModuleNotFound(module_id.to_string()))?;

        if !entry.metadata.enabled {
            return Err(LoadError::ModuleDisabled(module_id.to_string()));
        }

        entry.metadata.acquisitions += 1;
        debug!(endpoint, module_id, "Resolved module from registry");
        Ok(Arc::clone(&entry.factory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::mock::{MockFactory, MockPicker};

    fn factory() -> Arc<dyn PickerFactory> {
        Arc::new(MockFactory::new(Arc::new(MockPicker::new())))
    }

    #[tokio::test]
    async fn test_registry() {
        let registry = ModuleRegistry::new();
        registry.register("picker", factory()).await;

        assert!(registry.has("picker").await);
        assert!(!registry.has("uploader").await);
        assert!(registry.is_available("picker").await);

        registry.set_enabled("picker", false).await;

        assert!(registry.has("picker").await);
        assert!(!registry.is_available("picker").await);
    }

    #[tokio::test]
    async fn test_acquire_errors() {
        let registry = ModuleRegistry::new();
        registry.register("picker", factory()).await;

        let missing = registry.acquire("https://cdn.example.com", "uploader").await;
        assert!(matches!(missing, Err(LoadError::ModuleNotFound(id)) if id == "uploader"));

        let no_endpoint = registry.acquire("  ", "picker").await;
        assert!(matches!(no_endpoint, Err(LoadError::InvalidEndpoint(_))));

        registry.set_enabled("picker", false).await;
        let disabled = registry.acquire("https://cdn.example.com", "picker").await;
        assert!(matches!(disabled, Err(LoadError::ModuleDisabled(_))));
    }

    #[tokio::test]
    async fn test_acquire_counts() {
        let registry = ModuleRegistry::new();
        registry.register("picker", factory()).await;

        registry.acquire("https://cdn.example.com", "picker").await.unwrap();
        registry.acquire("https://cdn.example.com", "picker").await.unwrap();

        let meta = registry.get_metadata("picker").await.unwrap();
        assert_eq!(meta.acquisitions, 2);
    }
}
