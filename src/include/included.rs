//! Deduplicating accumulator for included entries

use crate::core::resource::{AccessFailure, CacheMaxAge, ResourceEntry, ResourceIdentity, ResourceObject};
use indexmap::IndexMap;
use std::sync::Arc;

/// Key under which an entry is deduplicated
///
/// Visible and label-only resources share the identity key. Denials are
/// keyed by identity and traversed field so that the same target denied
/// through two relationships is reported for each.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IncludedKey {
    Resource(ResourceIdentity),
    AccessDenied {
        target: ResourceIdentity,
        field: Option<String>,
    },
}

impl IncludedKey {
    pub fn of(entry: &ResourceEntry) -> Self {
        match entry {
            ResourceEntry::Resource(resource) | ResourceEntry::LabelOnly(resource) => {
                IncludedKey::Resource(resource.identity().clone())
            }
            ResourceEntry::Denied(failure) => IncludedKey::AccessDenied {
                target: failure.target.clone(),
                field: failure.relationship_field.clone(),
            },
        }
    }
}

/// Ordered set of included resources and access failures
///
/// The first occurrence of a key wins, both its position and its value.
#[derive(Debug, Clone, Default)]
pub struct IncludedSet {
    entries: IndexMap<IncludedKey, ResourceEntry>,
}

impl IncludedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry unless its key is already present
    ///
    /// Returns whether the entry was added.
    pub fn add(&mut self, entry: ResourceEntry) -> bool {
        let key = IncludedKey::of(&entry);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, entry);
        true
    }

    /// Append the entries of `other` that are not present yet
    pub fn merge(&mut self, other: IncludedSet) {
        for (key, entry) in other.entries {
            self.entries.entry(key).or_insert(entry);
        }
    }

    /// `a` followed by the new entries of `b`
    pub fn merged(mut a: IncludedSet, b: IncludedSet) -> IncludedSet {
        a.merge(b);
        a
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.values()
    }

    pub fn contains_resource(&self, identity: &ResourceIdentity) -> bool {
        self.entries
            .contains_key(&IncludedKey::Resource(identity.clone()))
    }

    pub fn contains_failure(&self, target: &ResourceIdentity, field: &str) -> bool {
        self.entries.contains_key(&IncludedKey::AccessDenied {
            target: target.clone(),
            field: Some(field.to_string()),
        })
    }

    /// Visible and label-only resources, in order
    pub fn resources(&self) -> impl Iterator<Item = &Arc<ResourceObject>> {
        self.entries.values().filter_map(ResourceEntry::resource_object)
    }

    /// Access failures, in order
    pub fn failures(&self) -> impl Iterator<Item = &AccessFailure> {
        self.entries.values().filter_map(ResourceEntry::access_failure)
    }

    /// Shortest cache lifetime among the included resources
    pub fn cache_max_age(&self) -> CacheMaxAge {
        self.iter()
            .map(ResourceEntry::cache_max_age)
            .fold(CacheMaxAge::Permanent, CacheMaxAge::merge)
    }

    pub fn into_entries(self) -> Vec<ResourceEntry> {
        self.entries.into_values().collect()
    }
}

impl FromIterator<ResourceEntry> for IncludedSet {
    fn from_iter<T: IntoIterator<Item = ResourceEntry>>(iter: T) -> Self {
        let mut set = IncludedSet::new();
        for entry in iter {
            set.add(entry);
        }
        set
    }
}

impl Extend<ResourceEntry> for IncludedSet {
    fn extend<T: IntoIterator<Item = ResourceEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.add(entry);
        }
    }
}

impl IntoIterator for IncludedSet {
    type Item = ResourceEntry;
    type IntoIter = indexmap::map::IntoValues<IncludedKey, ResourceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}
