//! In-memory resource type registry
//!
//! Resolves (kind, variant) pairs and type names to resource types, and
//! relationship fields to the resource types they may point to.

use super::{ResourceType, ResourceTypeRepository};
use crate::config::IncludesConfig;
use crate::core::error::{IncludeResult, SchemaError};
use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of every resource type of one schema generation
///
/// Built once and shared; lookups never mutate it.
#[derive(Debug, Default)]
pub struct ResourceTypeRegistry {
    /// Maps type name (`kind--variant`) -> resource type, in declaration order
    types: IndexMap<String, Arc<ResourceType>>,
}

impl ResourceTypeRegistry {
    /// Build the registry from a configuration document
    pub fn from_config(config: &IncludesConfig) -> IncludeResult<Self> {
        Self::from_types(
            config
                .resource_types
                .iter()
                .map(|rt| rt.to_resource_type()),
        )
    }

    /// Build the registry from resource types
    ///
    /// Fails when a (kind, variant) pair is declared twice or when a
    /// relationship targets a type that is not part of the set.
    pub fn from_types(types: impl IntoIterator<Item = ResourceType>) -> IncludeResult<Self> {
        let mut registry = IndexMap::new();

        for resource_type in types {
            let type_name = resource_type.type_name();
            if registry.contains_key(&type_name) {
                return Err(SchemaError::DuplicateResourceType { type_name }.into());
            }
            registry.insert(type_name, Arc::new(resource_type));
        }

        for (type_name, resource_type) in &registry {
            for field in resource_type.fields() {
                if let Some(target) = field
                    .relatable_type_names()
                    .iter()
                    .find(|target| !registry.contains_key(*target))
                {
                    return Err(SchemaError::UnknownRelatableType {
                        type_name: type_name.clone(),
                        field: field.public_name.clone(),
                        target: target.clone(),
                    }
                    .into());
                }
            }
        }

        Ok(Self { types: registry })
    }

    /// Number of registered resource types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// List the variants registered for a kind
    pub fn variants_of(&self, kind: &str) -> Vec<&str> {
        self.types
            .values()
            .filter(|rt| rt.kind() == kind)
            .map(|rt| rt.variant())
            .collect()
    }
}

impl ResourceTypeRepository for ResourceTypeRegistry {
    fn get(&self, kind: &str, variant: &str) -> Option<Arc<ResourceType>> {
        self.types
            .get(&ResourceType::type_name_for(kind, variant))
            .cloned()
    }

    fn get_by_type_name(&self, type_name: &str) -> Option<Arc<ResourceType>> {
        self.types.get(type_name).cloned()
    }

    fn all(&self) -> Vec<Arc<ResourceType>> {
        self.types.values().cloned().collect()
    }
}
