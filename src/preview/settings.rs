//! Preview settings
//!
//! ```yaml
//! preview:
//!   kind: node
//!   bundles: [article, page]
//!   includes:
//!     article: uid,field_tags
//! ```

use crate::core::error::{IncludeResult, SchemaError};
use crate::schema::{ResourceType, ResourceTypeRepository, validate_include_path};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which variants of one kind may be previewed, and what each one includes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewSettings {
    /// Kind of the previewable resources
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Variants enabled for preview
    #[serde(default)]
    pub bundles: Vec<String>,

    /// Variant -> comma-separated include paths
    #[serde(default)]
    pub includes: BTreeMap<String, String>,
}

fn default_kind() -> String {
    "node".to_string()
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            bundles: Vec::new(),
            includes: BTreeMap::new(),
        }
    }
}

impl PreviewSettings {
    pub fn is_enabled(&self, variant: &str) -> bool {
        self.bundles.iter().any(|bundle| bundle == variant)
    }

    /// Include parameter configured for an enabled variant
    pub fn includes_for(&self, variant: &str) -> Option<&str> {
        if !self.is_enabled(variant) {
            return None;
        }
        self.includes
            .get(variant)
            .map(|includes| includes.trim())
            .filter(|includes| !includes.is_empty())
    }

    /// Check every configured include path against the schema
    ///
    /// Fails on the first variant (in name order) that is unknown or has
    /// invalid paths; the error lists all invalid paths of that variant.
    pub fn validate(&self, repository: &dyn ResourceTypeRepository) -> IncludeResult<()> {
        for bundle in &self.bundles {
            if repository.get(&self.kind, bundle).is_none() {
                return Err(SchemaError::UnknownResourceType {
                    type_name: ResourceType::type_name_for(&self.kind, bundle),
                }
                .into());
            }
        }

        for (variant, includes) in &self.includes {
            if includes.trim().is_empty() {
                continue;
            }
            let resource_type = repository.get(&self.kind, variant).ok_or_else(|| {
                SchemaError::UnknownResourceType {
                    type_name: ResourceType::type_name_for(&self.kind, variant),
                }
            })?;

            let invalid: Vec<String> = includes
                .split(',')
                .map(str::trim)
                .filter(|path| !validate_include_path(repository, &resource_type, path))
                .map(str::to_string)
                .collect();
            if !invalid.is_empty() {
                tracing::warn!(
                    resource_type = %resource_type.type_name(),
                    paths = ?invalid,
                    "invalid preview include paths"
                );
                return Err(SchemaError::InvalidIncludes {
                    name: resource_type.type_name(),
                    paths: invalid,
                }
                .into());
            }
        }
        Ok(())
    }
}
