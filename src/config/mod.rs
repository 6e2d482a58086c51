//! Configuration loading and management
//!
//! The whole engine is described by one YAML document: the resource types
//! and their fields, the access policies guarding them, resolver tuning and
//! the optional preview settings.
//!
//! ```yaml
//! resource_types:
//!   - kind: node
//!     variant: article
//!     fields:
//!       - name: title
//!       - name: author
//!         internal_name: uid
//!         targets: [user--user]
//!         view: authenticated
//!   - kind: user
//!     variant: user
//!     access:
//!       view: authenticated
//!       view_label: public
//! preview:
//!   bundles: [article]
//!   includes:
//!     article: author
//! ```

use crate::core::error::{ConfigError, IncludeResult};
use crate::preview::PreviewSettings;
use crate::schema::{ResourceType, ResourceTypeField};
use serde::{Deserialize, Serialize};

/// Access policies guarding a resource type
///
/// Policies are parsed with [`AuthPolicy::parse_policy`](crate::core::auth::AuthPolicy::parse_policy).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceAccessConfig {
    /// Policy for viewing the full resource
    #[serde(default = "default_view_policy")]
    pub view: String,

    /// Policy for viewing only the label when `view` is denied
    #[serde(default)]
    pub view_label: Option<String>,
}

fn default_view_policy() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ResourceAccessConfig {
    fn default() -> Self {
        Self {
            view: default_view_policy(),
            view_label: None,
        }
    }
}

/// Configuration of one field of a resource type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldConfig {
    /// Public field name
    pub name: String,

    /// Internal name when the public name is an alias
    #[serde(default)]
    pub internal_name: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Relatable type names; present only for relationship fields
    #[serde(default)]
    pub targets: Option<Vec<String>>,

    /// Policy for viewing this field (defaults to public)
    #[serde(default)]
    pub view: Option<String>,
}

impl FieldConfig {
    pub fn to_field(&self) -> ResourceTypeField {
        let field = match &self.targets {
            Some(targets) => ResourceTypeField::relationship(&self.name, targets.iter().cloned()),
            None => ResourceTypeField::attribute(&self.name),
        };
        let field = match &self.internal_name {
            Some(internal) => field.with_internal_name(internal),
            None => field,
        };
        if self.enabled { field } else { field.disabled() }
    }
}

/// Configuration of one resource type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceTypeConfig {
    pub kind: String,
    pub variant: String,

    #[serde(default)]
    pub internal: bool,

    #[serde(default)]
    pub access: ResourceAccessConfig,

    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl ResourceTypeConfig {
    pub fn type_name(&self) -> String {
        ResourceType::type_name_for(&self.kind, &self.variant)
    }

    /// Build the immutable resource type described by this entry
    pub fn to_resource_type(&self) -> ResourceType {
        self.fields.iter().fold(
            ResourceType::new(&self.kind, &self.variant).with_internal(self.internal),
            |resource_type, field| resource_type.with_field(field.to_field()),
        )
    }
}

/// Tuning of the include resolver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Upper bound of loader batches in flight per tree level
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,

    /// Collapse repeated references to the same target before loading
    #[serde(default = "default_true")]
    pub dedupe_references: bool,
}

fn default_max_concurrent_batches() -> usize {
    8
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_batches: default_max_concurrent_batches(),
            dedupe_references: true,
        }
    }
}

/// Complete configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncludesConfig {
    #[serde(default)]
    pub resource_types: Vec<ResourceTypeConfig>,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub preview: Option<PreviewSettings>,
}

impl IncludesConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> IncludeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> IncludeResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Find the configuration of a resource type
    pub fn find_resource_type(&self, kind: &str, variant: &str) -> Option<&ResourceTypeConfig> {
        self.resource_types
            .iter()
            .find(|rt| rt.kind == kind && rt.variant == variant)
    }

    /// Merge several documents into one
    ///
    /// Resource types are keyed by (kind, variant): a later definition
    /// replaces an earlier one in place. The last resolver and preview
    /// sections win.
    pub fn merge(configs: Vec<IncludesConfig>) -> Self {
        let mut merged = IncludesConfig::default();

        for config in configs {
            for resource_type in config.resource_types {
                match merged
                    .resource_types
                    .iter_mut()
                    .find(|rt| rt.kind == resource_type.kind && rt.variant == resource_type.variant)
                {
                    Some(existing) => *existing = resource_type,
                    None => merged.resource_types.push(resource_type),
                }
            }
            merged.resolver = config.resolver;
            if config.preview.is_some() {
                merged.preview = config.preview;
            }
        }

        merged
    }
}
