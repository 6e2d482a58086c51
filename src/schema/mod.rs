//! Resource type schema: descriptions, lookup and include path validation

pub mod registry;
pub mod resource_type;
pub mod validator;

pub use registry::ResourceTypeRegistry;
pub use resource_type::{ResourceType, ResourceTypeField};
pub use validator::{is_valid_include, validate_include_path};

use std::sync::Arc;

/// Provider of resource type descriptions
///
/// Implementations must be deterministic and side-effect free for a given
/// schema generation.
pub trait ResourceTypeRepository: Send + Sync {
    /// Look up the type of a (kind, variant) pair
    fn get(&self, kind: &str, variant: &str) -> Option<Arc<ResourceType>>;

    /// Look up a type by its `kind--variant` name
    fn get_by_type_name(&self, type_name: &str) -> Option<Arc<ResourceType>>;

    /// All known types
    fn all(&self) -> Vec<Arc<ResourceType>>;

    /// Resource types the given field may relate to
    ///
    /// Empty for unknown fields and attribute fields. Targets that are not
    /// registered are skipped.
    fn relatable_resource_types(
        &self,
        resource_type: &ResourceType,
        public_name: &str,
    ) -> Vec<Arc<ResourceType>> {
        resource_type
            .relatable_type_names(public_name)
            .iter()
            .filter_map(|type_name| self.get_by_type_name(type_name))
            .collect()
    }
}
