//! Field value types

use crate::core::resource::{ResourceIdentity, ResourceObject};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// One reference held by a relationship field
///
/// `entity` is the already-loaded target when the reference comes from an
/// in-memory (possibly unsaved) edit. Preview resolution uses it instead of
/// asking the loader.
#[derive(Debug, Clone)]
pub struct RelationshipItem {
    pub target: ResourceIdentity,
    pub entity: Option<Arc<ResourceObject>>,
}

impl RelationshipItem {
    /// Reference a stored resource by identity
    pub fn reference(target: ResourceIdentity) -> Self {
        Self {
            target,
            entity: None,
        }
    }

    /// Reference an in-memory resource
    pub fn loaded(entity: Arc<ResourceObject>) -> Self {
        Self {
            target: entity.identity().clone(),
            entity: Some(entity),
        }
    }
}

impl PartialEq for RelationshipItem {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

/// A polymorphic field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    /// References to other resources; may be empty
    Relationship(Vec<RelationshipItem>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Get the references held by a relationship value
    pub fn as_relationship(&self) -> Option<&[RelationshipItem]> {
        match self {
            FieldValue::Relationship(items) => Some(items),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}
