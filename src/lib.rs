//! # Include-RS
//!
//! Resolution of relationship includes for typed resource collections.
//!
//! Given a set of root resources and an include parameter such as
//! `"comments.author,uid"`, the engine returns every related resource that
//! must be embedded next to the roots:
//!
//! - **Schema-aware validation**: include paths are checked against a
//!   dynamically described type graph with polymorphic relationships
//! - **Heterogeneous collections**: members may lack a field, be visible by
//!   label only, or be denied altogether
//! - **Access control as data**: denied relationships yield structured
//!   [`AccessFailure`](core::AccessFailure) entries instead of errors
//! - **Deduplication**: each resource appears once, in first-seen order
//! - **Preview mode**: unsaved edits resolve against in-memory objects
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use includes::prelude::*;
//!
//! let config = IncludesConfig::from_yaml_file("config/includes.yaml")?;
//! let registry = ResourceTypeRegistry::from_config(&config)?;
//! let access = Arc::new(PolicyAccessChecker::from_config(&config, AuthContext::Anonymous)?);
//! let loader = Arc::new(InMemoryResourceLoader::with_access_checker(access.clone()));
//!
//! let resolver = IncludeResolver::new(loader, access).with_config(config.resolver.clone());
//! let included = resolver
//!     .resolve(&roots, "comments.author", ResolutionMode::Standard)
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod include;
pub mod preview;
pub mod schema;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        access::{AccessChecker, AccessResult, AllowAllAccessChecker, PolicyAccessChecker},
        auth::{AuthContext, AuthPolicy},
        error::{IncludeError, IncludeResult},
        field::{FieldValue, RelationshipItem},
        loader::ResourceLoader,
        resource::{AccessFailure, CacheMaxAge, ResourceEntry, ResourceIdentity, ResourceObject},
    };

    // === Schema ===
    pub use crate::schema::{
        ResourceType, ResourceTypeField, ResourceTypeRegistry, ResourceTypeRepository,
        is_valid_include, validate_include_path,
    };

    // === Resolution ===
    pub use crate::include::{IncludeResolver, IncludeTree, IncludedSet, ResolutionMode};

    // === Preview ===
    pub use crate::preview::{PreviewDocument, PreviewService, PreviewSettings};

    // === Storage ===
    pub use crate::storage::InMemoryResourceLoader;

    // === Config ===
    pub use crate::config::{IncludesConfig, ResolverConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
    pub use tokio_util::sync::CancellationToken;
    pub use uuid::Uuid;
}
