//! In-memory implementation of ResourceLoader for testing and development

use crate::core::access::{AccessChecker, AllowAllAccessChecker};
use crate::core::loader::ResourceLoader;
use crate::core::resource::{ResourceEntry, ResourceIdentity, ResourceObject};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// In-memory resource loader
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Every loaded resource is passed through the configured access checker.
#[derive(Clone)]
pub struct InMemoryResourceLoader {
    resources: Arc<RwLock<HashMap<ResourceIdentity, Arc<ResourceObject>>>>,
    access: Arc<dyn AccessChecker>,
}

impl InMemoryResourceLoader {
    /// Create an empty loader that lets every resource through
    pub fn new() -> Self {
        Self::with_access_checker(Arc::new(AllowAllAccessChecker))
    }

    pub fn with_access_checker(access: Arc<dyn AccessChecker>) -> Self {
        Self {
            resources: Arc::new(RwLock::new(HashMap::new())),
            access,
        }
    }

    /// Store a resource, replacing any previous version
    pub fn insert(&self, resource: ResourceObject) -> Result<Arc<ResourceObject>> {
        let mut resources = self
            .resources
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let resource = Arc::new(resource);
        resources.insert(resource.identity().clone(), resource.clone());

        Ok(resource)
    }

    pub fn remove(&self, identity: &ResourceIdentity) -> Result<Option<Arc<ResourceObject>>> {
        let mut resources = self
            .resources
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(resources.remove(identity))
    }

    pub fn get(&self, identity: &ResourceIdentity) -> Result<Option<Arc<ResourceObject>>> {
        let resources = self
            .resources
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(resources.get(identity).cloned())
    }

    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryResourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceLoader for InMemoryResourceLoader {
    async fn load_access_checked(
        &self,
        kind: &str,
        ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<Vec<ResourceEntry>> {
        if cancel.is_cancelled() {
            return Err(anyhow!("Loading {} '{}' resource(s) was cancelled", ids.len(), kind));
        }

        let found: Vec<Arc<ResourceObject>> = {
            let resources = self
                .resources
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

            ids.iter()
                .filter_map(|id| resources.get(&ResourceIdentity::new(kind, *id)).cloned())
                .collect()
        };

        Ok(found
            .into_iter()
            .map(|resource| self.access.check_resource(resource))
            .collect())
    }
}
