//! Resource loading boundary

use crate::core::resource::{ResourceEntry, ResourceIdentity};
use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Access-checked loading of resources by id
///
/// The engine calls this once per (tree level, relationship field, target
/// kind) batch. Implementations may batch-fetch from their backing store.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// Load every requested id of `kind`, access-checked for the caller
    ///
    /// Returns one entry per found id, in request order. Unknown ids are
    /// omitted; "not found" is never an error. `Err` is reserved for backing
    /// failures. Implementations should stop early once `cancel` fires.
    async fn load_access_checked(
        &self,
        kind: &str,
        ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<Vec<ResourceEntry>>;

    /// Load a single resource
    async fn load_one(
        &self,
        identity: &ResourceIdentity,
        cancel: &CancellationToken,
    ) -> Result<Option<ResourceEntry>> {
        let mut entries = self
            .load_access_checked(&identity.kind, &[identity.id], cancel)
            .await?;
        Ok(entries.pop())
    }
}
