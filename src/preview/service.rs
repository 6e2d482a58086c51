//! Rendering of unsaved edits

use super::PreviewSettings;
use crate::core::error::{IncludeResult, PreviewError};
use crate::core::resource::{CacheMaxAge, ResourceEntry, ResourceObject};
use crate::include::{IncludeResolver, IncludedSet, ResolutionMode};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A previewed resource with everything it includes
#[derive(Debug, Clone)]
pub struct PreviewDocument {
    /// The previewed resource, as the caller may see it
    pub data: ResourceEntry,

    pub included: IncludedSet,

    /// Always [`CacheMaxAge::UNCACHEABLE`]
    pub cache_max_age: CacheMaxAge,
}

/// Renders in-memory resources together with their configured includes
///
/// Relationship targets come from the in-memory objects attached to each
/// reference; untouched references are read from storage.
pub struct PreviewService {
    settings: PreviewSettings,
    resolver: Arc<IncludeResolver>,
}

impl PreviewService {
    pub fn new(settings: PreviewSettings, resolver: Arc<IncludeResolver>) -> Self {
        Self { settings, resolver }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Render `root` with the configured includes plus `extra_includes`
    pub async fn render(
        &self,
        root: ResourceObject,
        extra_includes: &[&str],
    ) -> IncludeResult<PreviewDocument> {
        self.render_with_cancel(root, extra_includes, CancellationToken::new())
            .await
    }

    pub async fn render_with_cancel(
        &self,
        root: ResourceObject,
        extra_includes: &[&str],
        cancel: CancellationToken,
    ) -> IncludeResult<PreviewDocument> {
        let resource_type = root.resource_type().clone();
        if resource_type.kind() != self.settings.kind
            || !self.settings.is_enabled(resource_type.variant())
        {
            return Err(PreviewError::Disabled {
                type_name: resource_type.type_name(),
            }
            .into());
        }

        let data = self
            .resolver
            .access_checker()
            .check_resource(Arc::new(root.uncacheable()));
        if let ResourceEntry::Denied(failure) = &data {
            return Err(PreviewError::AccessDenied {
                type_name: resource_type.type_name(),
                id: failure.target.id,
                reason: failure.reason.clone(),
            }
            .into());
        }

        let include_parameter = self
            .settings
            .includes_for(resource_type.variant())
            .into_iter()
            .chain(extra_includes.iter().copied())
            .map(str::trim)
            .filter(|includes| !includes.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        tracing::info!(
            resource = %data.identity(),
            includes = %include_parameter,
            "rendering preview"
        );

        let included = self
            .resolver
            .resolve_with_cancel(
                std::slice::from_ref(&data),
                &include_parameter,
                ResolutionMode::Preview,
                cancel,
            )
            .await?;

        let cache_max_age = data
            .cache_max_age()
            .merge(included.cache_max_age())
            .merge(CacheMaxAge::UNCACHEABLE);

        Ok(PreviewDocument {
            data,
            included,
            cache_max_age,
        })
    }
}
