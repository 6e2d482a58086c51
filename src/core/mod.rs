//! Core module containing the resource model and the collaborator traits

pub mod access;
pub mod auth;
pub mod error;
pub mod field;
pub mod loader;
pub mod resource;

pub use access::{AccessChecker, AccessResult, AllowAllAccessChecker, PolicyAccessChecker};
pub use auth::{AuthContext, AuthPolicy};
pub use error::{IncludeError, IncludeResult};
pub use field::{FieldValue, RelationshipItem};
pub use loader::ResourceLoader;
pub use resource::{
    AccessFailure, CacheMaxAge, ResourceEntry, ResourceIdentity, ResourceObject,
};
