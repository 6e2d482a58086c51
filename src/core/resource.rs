//! Resource objects and the entries that make up resolved collections

use crate::core::field::{FieldValue, RelationshipItem};
use crate::schema::ResourceType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Message attached to every relationship that could not be traversed
pub const RELATIONSHIP_DENIED_MESSAGE: &str =
    "The current user is not allowed to view this relationship.";

/// Reason used when only the label of a resource may be seen
pub const LABEL_ONLY_REASON: &str =
    "The user only has authorization for the 'view label' operation.";

/// Stable identity of a resource within a resolution run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentity {
    /// The kind of entity (e.g., "node", "user")
    ///
    /// A String rather than an enum, so any kind can be resolved without
    /// touching the engine.
    pub kind: String,

    /// The unique ID of the resource
    pub id: Uuid,
}

impl ResourceIdentity {
    pub fn new(kind: impl Into<String>, id: Uuid) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// How long a rendering of a resource may be cached
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheMaxAge {
    #[default]
    Permanent,
    Seconds(u32),
}

impl CacheMaxAge {
    /// Zero lifetime: must never be stored in a shared cache
    pub const UNCACHEABLE: CacheMaxAge = CacheMaxAge::Seconds(0);

    /// Combine two lifetimes, keeping the shorter one
    pub fn merge(self, other: CacheMaxAge) -> CacheMaxAge {
        match (self, other) {
            (CacheMaxAge::Permanent, other) => other,
            (this, CacheMaxAge::Permanent) => this,
            (CacheMaxAge::Seconds(a), CacheMaxAge::Seconds(b)) => CacheMaxAge::Seconds(a.min(b)),
        }
    }

    pub fn is_cacheable(self) -> bool {
        self != CacheMaxAge::UNCACHEABLE
    }
}

/// A fetched (or in-memory edited) resource with its type and public fields
///
/// Resource objects are immutable once built; helpers that change the cache
/// lifetime return a new value.
#[derive(Debug, Clone)]
pub struct ResourceObject {
    resource_type: Arc<ResourceType>,
    identity: ResourceIdentity,
    label: Option<String>,
    fields: IndexMap<String, FieldValue>,
    cache_max_age: CacheMaxAge,
}

impl ResourceObject {
    /// Create a resource of the given type; its identity kind is the type's kind
    pub fn new(resource_type: Arc<ResourceType>, id: Uuid) -> Self {
        let identity = ResourceIdentity::new(resource_type.kind(), id);
        Self {
            resource_type,
            identity,
            label: None,
            fields: IndexMap::new(),
            cache_max_age: CacheMaxAge::Permanent,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set a public field value
    pub fn with_field(mut self, public_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(public_name.into(), value.into());
        self
    }

    /// Set a relationship field from its references
    pub fn with_relationship(
        self,
        public_name: impl Into<String>,
        items: impl IntoIterator<Item = RelationshipItem>,
    ) -> Self {
        self.with_field(
            public_name,
            FieldValue::Relationship(items.into_iter().collect()),
        )
    }

    pub fn resource_type(&self) -> &Arc<ResourceType> {
        &self.resource_type
    }

    pub fn type_name(&self) -> String {
        self.resource_type.type_name()
    }

    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    pub fn id(&self) -> Uuid {
        self.identity.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether this instance exposes the field
    ///
    /// Collections mix variants with different field sets, so a missing
    /// field is an ordinary condition, not an error.
    pub fn has_field(&self, public_name: &str) -> bool {
        self.resource_type.has_field(public_name) && self.fields.contains_key(public_name)
    }

    pub fn field(&self, public_name: &str) -> Option<&FieldValue> {
        if !self.has_field(public_name) {
            return None;
        }
        self.fields.get(public_name)
    }

    /// References held by a relationship field
    ///
    /// `None` when the field is absent or is not a relationship.
    pub fn relationship(&self, public_name: &str) -> Option<&[RelationshipItem]> {
        self.field(public_name).and_then(FieldValue::as_relationship)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .filter(|(name, _)| self.resource_type.has_field(name))
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn cache_max_age(&self) -> CacheMaxAge {
        self.cache_max_age
    }

    /// Shorten the cache lifetime
    pub fn merge_cache_max_age(mut self, max_age: CacheMaxAge) -> Self {
        self.cache_max_age = self.cache_max_age.merge(max_age);
        self
    }

    /// Copy of this resource that must never be cached
    pub fn uncacheable(self) -> Self {
        self.merge_cache_max_age(CacheMaxAge::UNCACHEABLE)
    }
}

/// Placeholder for a resource or relationship the caller may not see
///
/// Carried inline in results so the caller can render an explicit denial
/// instead of silently dropping data.
#[derive(Debug, Clone)]
pub struct AccessFailure {
    /// The denied resource (for field denials, the resource holding the field)
    pub target: ResourceIdentity,

    /// Type of the denied resource, when known
    pub resource_type: Option<Arc<ResourceType>>,

    /// The attempted operation (e.g. "view")
    pub operation: String,

    /// Why access was denied
    pub reason: String,

    /// Human-readable message for the response
    pub message: String,

    /// The relationship field being traversed when access was denied
    pub relationship_field: Option<String>,
}

impl AccessFailure {
    pub fn new(
        target: ResourceIdentity,
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            target,
            resource_type: None,
            operation: operation.into(),
            reason: reason.into(),
            message: String::new(),
            relationship_field: None,
        }
    }

    /// Denied "view" of a whole resource
    pub fn for_resource(resource: &ResourceObject, reason: impl Into<String>) -> Self {
        Self {
            resource_type: Some(resource.resource_type().clone()),
            message: "The current user is not allowed to GET the selected resource.".to_string(),
            ..Self::new(resource.identity().clone(), "view", reason)
        }
    }

    /// Denied "view" of a relationship field of `resource`
    pub fn relationship_denied(
        resource: &ResourceObject,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: Some(resource.resource_type().clone()),
            message: RELATIONSHIP_DENIED_MESSAGE.to_string(),
            relationship_field: Some(field.into()),
            ..Self::new(resource.identity().clone(), "view", reason)
        }
    }

    /// Relationship of a resource that is only visible by label
    pub fn label_only(resource: &ResourceObject, field: impl Into<String>) -> Self {
        Self::relationship_denied(resource, field, LABEL_ONLY_REASON)
    }

    /// Record the relationship traversed to reach the target, unless already set
    pub fn with_relationship_field(mut self, field: impl Into<String>) -> Self {
        if self.relationship_field.is_none() {
            self.relationship_field = Some(field.into());
        }
        self
    }

    pub fn is_internal(&self) -> bool {
        self.resource_type
            .as_ref()
            .is_some_and(|resource_type| resource_type.is_internal())
    }
}

impl fmt::Display for AccessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relationship_field {
            Some(field) => write!(
                f,
                "{} denied on {} via '{}': {}",
                self.operation, self.target, field, self.reason
            ),
            None => write!(f, "{} denied on {}: {}", self.operation, self.target, self.reason),
        }
    }
}

/// One member of a collection being resolved
///
/// Collections are heterogeneous: some members are fully visible, some only
/// by label, some denied outright. Traversal dispatches on this tag.
#[derive(Debug, Clone)]
pub enum ResourceEntry {
    /// Fully visible resource
    Resource(Arc<ResourceObject>),

    /// Resource whose label is the only visible part
    LabelOnly(Arc<ResourceObject>),

    /// Resource the caller may not see at all
    Denied(AccessFailure),
}

impl ResourceEntry {
    pub fn resource(resource: ResourceObject) -> Self {
        ResourceEntry::Resource(Arc::new(resource))
    }

    pub fn identity(&self) -> &ResourceIdentity {
        match self {
            ResourceEntry::Resource(resource) | ResourceEntry::LabelOnly(resource) => {
                resource.identity()
            }
            ResourceEntry::Denied(failure) => &failure.target,
        }
    }

    pub fn resource_object(&self) -> Option<&Arc<ResourceObject>> {
        match self {
            ResourceEntry::Resource(resource) | ResourceEntry::LabelOnly(resource) => Some(resource),
            ResourceEntry::Denied(_) => None,
        }
    }

    pub fn access_failure(&self) -> Option<&AccessFailure> {
        match self {
            ResourceEntry::Denied(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether the entry's type must never appear in output
    pub fn is_internal(&self) -> bool {
        match self {
            ResourceEntry::Resource(resource) | ResourceEntry::LabelOnly(resource) => {
                resource.resource_type().is_internal()
            }
            ResourceEntry::Denied(failure) => failure.is_internal(),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, ResourceEntry::Denied(_))
    }

    pub fn cache_max_age(&self) -> CacheMaxAge {
        self.resource_object()
            .map(|resource| resource.cache_max_age())
            .unwrap_or_default()
    }

    /// Force a zero cache lifetime on the wrapped resource
    pub fn uncacheable(self) -> Self {
        match self {
            ResourceEntry::Resource(resource) => {
                ResourceEntry::Resource(Arc::new(Arc::unwrap_or_clone(resource).uncacheable()))
            }
            ResourceEntry::LabelOnly(resource) => {
                ResourceEntry::LabelOnly(Arc::new(Arc::unwrap_or_clone(resource).uncacheable()))
            }
            denied => denied,
        }
    }

    /// Tag denials with the relationship that led to them
    pub fn with_relationship_field(self, field: &str) -> Self {
        match self {
            ResourceEntry::Denied(failure) => {
                ResourceEntry::Denied(failure.with_relationship_field(field))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ResourceTypeField;

    fn user_type() -> Arc<ResourceType> {
        Arc::new(
            ResourceType::new("user", "user")
                .with_field(ResourceTypeField::attribute("name"))
                .with_field(ResourceTypeField::relationship("manager", ["user--user"]))
                .with_field(ResourceTypeField::attribute("pass").disabled()),
        )
    }

    #[test]
    fn test_resource_identity_creation() {
        let id = Uuid::new_v4();
        let identity = ResourceIdentity::new("user", id);

        assert_eq!(identity.id, id);
        assert_eq!(identity.kind, "user");
        assert_eq!(identity.to_string(), format!("user:{}", id));
    }

    #[test]
    fn test_cache_max_age_merge_keeps_shortest() {
        assert_eq!(
            CacheMaxAge::Permanent.merge(CacheMaxAge::Seconds(60)),
            CacheMaxAge::Seconds(60)
        );
        assert_eq!(
            CacheMaxAge::Seconds(60).merge(CacheMaxAge::Permanent),
            CacheMaxAge::Seconds(60)
        );
        assert_eq!(
            CacheMaxAge::Seconds(60).merge(CacheMaxAge::UNCACHEABLE),
            CacheMaxAge::UNCACHEABLE
        );
        assert!(CacheMaxAge::Permanent.is_cacheable());
        assert!(!CacheMaxAge::UNCACHEABLE.is_cacheable());
    }

    #[test]
    fn test_resource_fields_follow_schema() {
        let user = ResourceObject::new(user_type(), Uuid::new_v4())
            .with_label("Ada")
            .with_field("name", "Ada")
            .with_field("pass", "secret")
            .with_field("unknown", true);

        assert_eq!(user.label(), Some("Ada"));
        assert!(user.has_field("name"));
        // disabled in the schema
        assert!(!user.has_field("pass"));
        assert!(user.field("pass").is_none());
        // not part of the schema
        assert!(!user.has_field("unknown"));
        // part of the schema, not set on this instance
        assert!(!user.has_field("manager"));

        let names: Vec<_> = user.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name"]);
    }

    #[test]
    fn test_relationship_accessor() {
        let manager = ResourceIdentity::new("user", Uuid::new_v4());
        let user = ResourceObject::new(user_type(), Uuid::new_v4())
            .with_field("name", "Ada")
            .with_relationship("manager", [RelationshipItem::reference(manager.clone())]);

        let items = user.relationship("manager").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].target, manager);
        assert!(user.relationship("name").is_none());
    }

    #[test]
    fn test_uncacheable_copy() {
        let user = ResourceObject::new(user_type(), Uuid::new_v4())
            .merge_cache_max_age(CacheMaxAge::Seconds(300));
        assert_eq!(user.cache_max_age(), CacheMaxAge::Seconds(300));

        let preview = user.clone().uncacheable();
        assert_eq!(preview.cache_max_age(), CacheMaxAge::UNCACHEABLE);
        assert_eq!(user.cache_max_age(), CacheMaxAge::Seconds(300));
    }

    #[test]
    fn test_access_failure_constructors() {
        let user = ResourceObject::new(user_type(), Uuid::new_v4());

        let denied = AccessFailure::relationship_denied(&user, "manager", "policy 'admin_only'");
        assert_eq!(denied.target, *user.identity());
        assert_eq!(denied.operation, "view");
        assert_eq!(denied.relationship_field.as_deref(), Some("manager"));
        assert_eq!(denied.message, RELATIONSHIP_DENIED_MESSAGE);

        let label_only = AccessFailure::label_only(&user, "manager");
        assert_eq!(label_only.reason, LABEL_ONLY_REASON);

        let resource = AccessFailure::for_resource(&user, "nope").with_relationship_field("author");
        assert_eq!(resource.relationship_field.as_deref(), Some("author"));
        // already tagged: the first field wins
        let resource = resource.with_relationship_field("editor");
        assert_eq!(resource.relationship_field.as_deref(), Some("author"));
    }

    #[test]
    fn test_entry_internal_flag() {
        let file_type = Arc::new(ResourceType::new("file", "file").with_internal(true));
        let file = ResourceObject::new(file_type, Uuid::new_v4());

        assert!(ResourceEntry::Denied(AccessFailure::for_resource(&file, "x")).is_internal());
        assert!(ResourceEntry::resource(file).is_internal());

        let unknown = AccessFailure::new(ResourceIdentity::new("file", Uuid::new_v4()), "view", "x");
        assert!(!ResourceEntry::Denied(unknown).is_internal());
    }
}
