//! Shared fixtures for integration tests
//!
//! Provides a small blog schema, helpers to build resources with readable
//! numeric ids, and loaders that record or fail their calls.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod fixtures;
//! use fixtures::*;
//! ```

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use includes::prelude::*;

pub const SCHEMA_YAML: &str = r#"
resource_types:
  - kind: user
    variant: user
    fields:
      - name: name
      - name: manager
        targets: [user--user]
      - name: picture
        targets: [file--file]
  - kind: node
    variant: post
    fields:
      - name: title
      - name: author
        internal_name: uid
        targets: [user--user]
      - name: editor
        targets: [user--user]
      - name: comments
        targets: [comment--comment]
      - name: secret
        targets: [user--user]
        view: admin_only
      - name: revision_user
        targets: [user--user]
        enabled: false
  - kind: node
    variant: page
    fields:
      - name: title
      - name: author
        internal_name: uid
        targets: [user--user]
  - kind: comment
    variant: comment
    fields:
      - name: body
      - name: author
        targets: [user--user]
  - kind: file
    variant: file
    internal: true
    fields:
      - name: uri
preview:
  bundles: [post]
  includes:
    post: author,comments.author
"#;

/// Readable, stable ids: `id(5)` is always the same UUID
pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn config() -> IncludesConfig {
    IncludesConfig::from_yaml_str(SCHEMA_YAML).unwrap()
}

/// Policies of the blog schema evaluated for `context`
pub fn policies(context: AuthContext) -> PolicyAccessChecker {
    PolicyAccessChecker::from_config(&config(), context).unwrap()
}

pub fn reference(kind: &str, n: u128) -> RelationshipItem {
    RelationshipItem::reference(ResourceIdentity::new(kind, id(n)))
}

/// Ids of the visible and label-only resources of a set, in order
pub fn resource_ids(set: &IncludedSet) -> Vec<Uuid> {
    set.resources().map(|r| r.id()).collect()
}

/// (target id, field) of every access failure of a set, in order
pub fn failure_keys(set: &IncludedSet) -> Vec<(Uuid, Option<String>)> {
    set.failures()
        .map(|f| (f.target.id, f.relationship_field.clone()))
        .collect()
}

/// Blog schema with a store of resources
pub struct Blog {
    pub config: IncludesConfig,
    pub registry: ResourceTypeRegistry,
    pub loader: InMemoryResourceLoader,
    pub access: Arc<dyn AccessChecker>,
}

impl Blog {
    /// Everything visible
    pub fn new() -> Self {
        Self::with_access(Arc::new(AllowAllAccessChecker))
    }

    /// Policies of the schema evaluated for `context`
    pub fn for_context(context: AuthContext) -> Self {
        Self::with_access(Arc::new(policies(context)))
    }

    pub fn with_access(access: Arc<dyn AccessChecker>) -> Self {
        let config = config();
        let registry = ResourceTypeRegistry::from_config(&config).unwrap();
        let loader = InMemoryResourceLoader::with_access_checker(access.clone());
        Self {
            config,
            registry,
            loader,
            access,
        }
    }

    pub fn resource_type(&self, type_name: &str) -> Arc<ResourceType> {
        self.registry.get_by_type_name(type_name).unwrap()
    }

    pub fn user(&self, n: u128, manager: Option<u128>) -> ResourceObject {
        let user = ResourceObject::new(self.resource_type("user--user"), id(n))
            .with_label(format!("User {}", n))
            .with_field("name", format!("User {}", n));
        match manager {
            Some(manager) => user.with_relationship("manager", [reference("user", manager)]),
            None => user.with_field("manager", FieldValue::Null),
        }
    }

    pub fn post(&self, n: u128) -> ResourceObject {
        ResourceObject::new(self.resource_type("node--post"), id(n))
            .with_label(format!("Post {}", n))
            .with_field("title", format!("Post {}", n))
    }

    pub fn page(&self, n: u128) -> ResourceObject {
        ResourceObject::new(self.resource_type("node--page"), id(n))
            .with_label(format!("Page {}", n))
            .with_field("title", format!("Page {}", n))
    }

    pub fn comment(&self, n: u128, author: u128) -> ResourceObject {
        ResourceObject::new(self.resource_type("comment--comment"), id(n))
            .with_field("body", format!("Comment {}", n))
            .with_relationship("author", [reference("user", author)])
    }

    pub fn file(&self, n: u128) -> ResourceObject {
        ResourceObject::new(self.resource_type("file--file"), id(n)).with_field("uri", "public://a.png")
    }

    /// Put a resource in the store
    pub fn store(&self, resource: ResourceObject) -> Arc<ResourceObject> {
        self.loader.insert(resource).unwrap()
    }

    /// Root entries as an upstream caller would pass them
    pub fn roots(&self, resources: impl IntoIterator<Item = ResourceObject>) -> Vec<ResourceEntry> {
        resources
            .into_iter()
            .map(|resource| self.access.check_resource(Arc::new(resource)))
            .collect()
    }

    pub fn resolver(&self) -> IncludeResolver {
        self.resolver_with_loader(Arc::new(self.loader.clone()))
    }

    pub fn resolver_with_loader(&self, loader: Arc<dyn ResourceLoader>) -> IncludeResolver {
        IncludeResolver::new(loader, self.access.clone()).with_config(self.config.resolver.clone())
    }
}

/// Loader recording every batch it receives
pub struct RecordingLoader {
    inner: Arc<dyn ResourceLoader>,
    calls: Mutex<Vec<(String, Vec<Uuid>)>>,
}

impl RecordingLoader {
    pub fn new(inner: Arc<dyn ResourceLoader>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<Uuid>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceLoader for RecordingLoader {
    async fn load_access_checked(
        &self,
        kind: &str,
        ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<Vec<ResourceEntry>> {
        self.calls
            .lock()
            .unwrap()
            .push((kind.to_string(), ids.to_vec()));
        self.inner.load_access_checked(kind, ids, cancel).await
    }
}

/// Loader failing for one kind and delegating the others
pub struct FailingLoader {
    inner: Arc<dyn ResourceLoader>,
    kind: String,
}

impl FailingLoader {
    pub fn new(inner: Arc<dyn ResourceLoader>, kind: &str) -> Self {
        Self {
            inner,
            kind: kind.to_string(),
        }
    }
}

#[async_trait]
impl ResourceLoader for FailingLoader {
    async fn load_access_checked(
        &self,
        kind: &str,
        ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<Vec<ResourceEntry>> {
        if kind == self.kind {
            return Err(anyhow!("connection reset while loading {}", kind));
        }
        self.inner.load_access_checked(kind, ids, cancel).await
    }
}

/// Loader that never answers
pub struct PendingLoader;

#[async_trait]
impl ResourceLoader for PendingLoader {
    async fn load_access_checked(
        &self,
        _kind: &str,
        _ids: &[Uuid],
        _cancel: &CancellationToken,
    ) -> Result<Vec<ResourceEntry>> {
        futures::future::pending().await
    }
}
