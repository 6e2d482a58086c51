//! Resource type descriptions
//!
//! A resource type describes one (kind, variant) pair: which public fields
//! it exposes and, for relationship fields, which other resource types the
//! field may point to.

use indexmap::IndexMap;

/// Descriptor of a single field of a resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypeField {
    /// The name clients use (e.g. in include paths)
    pub public_name: String,

    /// The name used by the backing entity
    pub internal_name: String,

    /// Disabled fields are never exposed
    pub enabled: bool,

    /// Type names of the resource types this field may relate to
    ///
    /// `None` for attribute fields. A relationship may be polymorphic, so
    /// this is a list rather than a single target.
    pub relatable: Option<Vec<String>>,
}

impl ResourceTypeField {
    /// Create an enabled attribute field
    pub fn attribute(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            internal_name: name.clone(),
            public_name: name,
            enabled: true,
            relatable: None,
        }
    }

    /// Create an enabled relationship field
    pub fn relationship<I, S>(name: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        Self {
            internal_name: name.clone(),
            public_name: name,
            enabled: true,
            relatable: Some(targets.into_iter().map(Into::into).collect()),
        }
    }

    /// Expose the field under a public alias
    pub fn with_internal_name(mut self, internal_name: impl Into<String>) -> Self {
        self.internal_name = internal_name.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn is_relationship(&self) -> bool {
        self.relatable.is_some()
    }

    /// Type names this field may relate to (empty for attributes)
    pub fn relatable_type_names(&self) -> &[String] {
        self.relatable.as_deref().unwrap_or_default()
    }
}

/// Schema of one (kind, variant) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    kind: String,
    variant: String,
    internal: bool,
    fields: IndexMap<String, ResourceTypeField>,
}

impl ResourceType {
    pub fn new(kind: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            variant: variant.into(),
            internal: false,
            fields: IndexMap::new(),
        }
    }

    /// Add a field, keyed by its public name
    pub fn with_field(mut self, field: ResourceTypeField) -> Self {
        self.fields.insert(field.public_name.clone(), field);
        self
    }

    /// Mark the type as internal: resources of this type are never included
    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// The entity kind (e.g. "node", "user")
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The variant within the kind (e.g. "article")
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Unique name of the type: `{kind}--{variant}`
    pub fn type_name(&self) -> String {
        Self::type_name_for(&self.kind, &self.variant)
    }

    pub fn type_name_for(kind: &str, variant: &str) -> String {
        format!("{}--{}", kind, variant)
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn field_by_public_name(&self, public_name: &str) -> Option<&ResourceTypeField> {
        self.fields.get(public_name)
    }

    /// Whether the type exposes an enabled field under this public name
    pub fn has_field(&self, public_name: &str) -> bool {
        self.fields
            .get(public_name)
            .is_some_and(|field| field.enabled)
    }

    /// Map an internal field name to its public name
    ///
    /// Falls back to the given name when no field carries it internally.
    pub fn public_name<'a>(&'a self, internal_name: &'a str) -> &'a str {
        self.fields
            .values()
            .find(|field| field.internal_name == internal_name)
            .map(|field| field.public_name.as_str())
            .unwrap_or(internal_name)
    }

    /// Iterate over fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &ResourceTypeField> {
        self.fields.values()
    }

    /// Type names the given field may relate to
    pub fn relatable_type_names(&self, public_name: &str) -> &[String] {
        self.fields
            .get(public_name)
            .map(ResourceTypeField::relatable_type_names)
            .unwrap_or_default()
    }
}
