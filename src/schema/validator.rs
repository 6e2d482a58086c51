//! Include path validation against the resource type schema
//!
//! Validation happens before any resource is loaded, so the concrete target
//! type of a relationship is unknown. A path is therefore valid as soon as
//! one of the field's relatable types accepts the remainder.

use super::{ResourceType, ResourceTypeRepository};

/// Check a dotted include path (e.g. `"uid.user_picture"`) against `root`
///
/// Empty paths and paths with empty segments are invalid.
pub fn validate_include_path(
    repository: &dyn ResourceTypeRepository,
    root: &ResourceType,
    dotted_path: &str,
) -> bool {
    let segments: Vec<&str> = dotted_path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return false;
    }
    is_valid_include(repository, root, &segments)
}

/// Check a path already split into segments against `root`
///
/// Every segment but the last must name an enabled relationship field; the
/// last must name an enabled field. Internal target types never validate.
pub fn is_valid_include(
    repository: &dyn ResourceTypeRepository,
    root: &ResourceType,
    segments: &[&str],
) -> bool {
    let Some((public_name, remaining)) = segments.split_first() else {
        return false;
    };
    let Some(field) = root.field_by_public_name(public_name) else {
        return false;
    };
    if !field.enabled {
        return false;
    }
    if remaining.is_empty() {
        return true;
    }
    if !field.is_relationship() {
        return false;
    }

    repository
        .relatable_resource_types(root, public_name)
        .iter()
        .filter(|target| !target.is_internal())
        .any(|target| is_valid_include(repository, target, remaining))
}
