//! Typed error handling for include resolution
//!
//! Access denials are never errors here: they travel as
//! [`AccessFailure`](crate::core::resource::AccessFailure) entries inside the
//! included set. This module only covers the conditions that abort a call.
//!
//! # Error Categories
//!
//! - [`PathError`]: malformed include parameters (request validation)
//! - [`SchemaError`]: unknown resource types and invalid configured includes
//! - [`LoaderError`]: backing failures of the resource loader
//! - [`ConfigError`]: configuration parsing and IO
//! - [`PreviewError`]: preview requests that cannot be rendered
//!
//! # Example
//!
//! ```rust,ignore
//! match resolver.resolve(&roots, "comments.author", ResolutionMode::Standard).await {
//!     Ok(included) => render(included),
//!     Err(IncludeError::Path(PathError::Malformed { path, .. })) => {
//!         reject(format!("bad include path {}", path))
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The main error type of the crate
#[derive(Debug)]
pub enum IncludeError {
    /// The include parameter could not be parsed
    Path(PathError),

    /// Schema lookups or configured include paths failed
    Schema(SchemaError),

    /// The resource loader could not complete a batch
    Loader(LoaderError),

    /// Configuration errors
    Config(ConfigError),

    /// Preview rendering errors
    Preview(PreviewError),

    /// The caller cancelled the resolution; partial results were discarded
    Cancelled,

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for IncludeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeError::Path(e) => write!(f, "{}", e),
            IncludeError::Schema(e) => write!(f, "{}", e),
            IncludeError::Loader(e) => write!(f, "{}", e),
            IncludeError::Config(e) => write!(f, "{}", e),
            IncludeError::Preview(e) => write!(f, "{}", e),
            IncludeError::Cancelled => write!(f, "Include resolution was cancelled"),
            IncludeError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for IncludeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IncludeError::Path(e) => Some(e),
            IncludeError::Schema(e) => Some(e),
            IncludeError::Loader(e) => Some(e),
            IncludeError::Config(e) => Some(e),
            IncludeError::Preview(e) => Some(e),
            IncludeError::Cancelled | IncludeError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IncludeError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IncludeError::Path(_) => StatusCode::BAD_REQUEST,
            IncludeError::Schema(e) => e.status_code(),
            IncludeError::Loader(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IncludeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IncludeError::Preview(e) => e.status_code(),
            IncludeError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            IncludeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            IncludeError::Path(_) => "MALFORMED_INCLUDE_PATH",
            IncludeError::Schema(e) => e.error_code(),
            IncludeError::Loader(_) => "LOADER_FAILURE",
            IncludeError::Config(ConfigError::UnknownPolicy { .. }) => "UNKNOWN_POLICY",
            IncludeError::Config(_) => "CONFIG_ERROR",
            IncludeError::Preview(e) => e.error_code(),
            IncludeError::Cancelled => "CANCELLED",
            IncludeError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            IncludeError::Path(PathError::Malformed { path, .. }) => {
                Some(serde_json::json!({ "path": path }))
            }
            IncludeError::Schema(SchemaError::InvalidIncludes { name, paths }) => {
                Some(serde_json::json!({ "resource_type": name, "paths": paths }))
            }
            IncludeError::Loader(LoaderError::BatchFailed { kind, count, .. }) => {
                Some(serde_json::json!({ "kind": kind, "count": count }))
            }
            IncludeError::Config(ConfigError::UnknownPolicy { policy }) => {
                Some(serde_json::json!({ "policy": policy }))
            }
            IncludeError::Preview(PreviewError::AccessDenied { type_name, id, .. }) => {
                Some(serde_json::json!({
                    "resource_type": type_name,
                    "id": id.to_string()
                }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for IncludeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Path Errors
// =============================================================================

/// Structurally invalid include parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A path contains an empty segment, or a comma-separated entry is empty
    #[error("Malformed include path '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

impl PathError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        PathError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The offending path
    pub fn path(&self) -> &str {
        match self {
            PathError::Malformed { path, .. } => path,
        }
    }
}

impl From<PathError> for IncludeError {
    fn from(err: PathError) -> Self {
        IncludeError::Path(err)
    }
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors related to resource type lookups and include validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No resource type is registered under this name
    #[error("Unknown resource type: {type_name}")]
    UnknownResourceType { type_name: String },

    /// A relationship field points at a type that is not registered
    #[error("Field '{field}' of {type_name} relates to unknown resource type '{target}'")]
    UnknownRelatableType {
        type_name: String,
        field: String,
        target: String,
    },

    /// Two resource types share the same (kind, variant) pair
    #[error("Resource type {type_name} is defined more than once")]
    DuplicateResourceType { type_name: String },

    /// Configured include paths do not validate against the schema
    #[error("The include path at {} is invalid for {name}.", .paths.join(","))]
    InvalidIncludes { name: String, paths: Vec<String> },
}

impl SchemaError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SchemaError::UnknownResourceType { .. } => StatusCode::BAD_REQUEST,
            SchemaError::InvalidIncludes { .. } => StatusCode::BAD_REQUEST,
            SchemaError::UnknownRelatableType { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SchemaError::DuplicateResourceType { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SchemaError::UnknownResourceType { .. } => "UNKNOWN_RESOURCE_TYPE",
            SchemaError::UnknownRelatableType { .. } => "UNKNOWN_RELATABLE_TYPE",
            SchemaError::DuplicateResourceType { .. } => "DUPLICATE_RESOURCE_TYPE",
            SchemaError::InvalidIncludes { .. } => "INVALID_INCLUDES",
        }
    }
}

impl From<SchemaError> for IncludeError {
    fn from(err: SchemaError) -> Self {
        IncludeError::Schema(err)
    }
}

// =============================================================================
// Loader Errors
// =============================================================================

/// Backing failures of a [`ResourceLoader`](crate::core::loader::ResourceLoader)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("Failed to load {count} '{kind}' resource(s): {message}")]
    BatchFailed {
        kind: String,
        count: usize,
        message: String,
    },
}

impl From<LoaderError> for IncludeError {
    fn from(err: LoaderError) -> Self {
        IncludeError::Loader(err)
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Failed to parse configuration{}: {message}", .file.as_deref().map(|f| format!(" '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// An access policy name that no [`AuthPolicy`](crate::core::auth::AuthPolicy) matches
    #[error("Unknown access policy '{policy}'")]
    UnknownPolicy { policy: String },
}

impl From<ConfigError> for IncludeError {
    fn from(err: ConfigError) -> Self {
        IncludeError::Config(err)
    }
}

// =============================================================================
// Preview Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    /// The resource's variant is not enabled for preview
    #[error("Preview is not enabled for {type_name}")]
    Disabled { type_name: String },

    /// The previewed resource itself failed its access check
    #[error("Access denied to preview {type_name} '{id}': {reason}")]
    AccessDenied {
        type_name: String,
        id: Uuid,
        reason: String,
    },
}

impl PreviewError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PreviewError::Disabled { .. } => StatusCode::BAD_REQUEST,
            PreviewError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PreviewError::Disabled { .. } => "PREVIEW_DISABLED",
            PreviewError::AccessDenied { .. } => "PREVIEW_ACCESS_DENIED",
        }
    }
}

impl From<PreviewError> for IncludeError {
    fn from(err: PreviewError) -> Self {
        IncludeError::Preview(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<std::io::Error> for IncludeError {
    fn from(err: std::io::Error) -> Self {
        IncludeError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for IncludeError {
    fn from(err: serde_yaml::Error) -> Self {
        IncludeError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

/// Convert from anyhow::Error for collaborators that report untyped failures
impl From<anyhow::Error> for IncludeError {
    fn from(err: anyhow::Error) -> Self {
        IncludeError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for include operations
pub type IncludeResult<T> = Result<T, IncludeError>;
