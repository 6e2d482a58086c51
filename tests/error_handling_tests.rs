//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Error conversions work correctly
//! - Error matching allows clients to handle specific cases

use axum::http::StatusCode;
use axum::response::IntoResponse;
use includes::core::error::{
    ConfigError, LoaderError, PathError, PreviewError, SchemaError,
};
use includes::prelude::*;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_malformed_path_returns_400() {
        let err = IncludeError::Path(PathError::malformed("a..b", "empty path segment"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_includes_returns_400() {
        let err = IncludeError::Schema(SchemaError::InvalidIncludes {
            name: "node--article".to_string(),
            paths: vec!["nope".to_string()],
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_relatable_type_returns_500() {
        let err = IncludeError::Schema(SchemaError::UnknownRelatableType {
            type_name: "node--article".to_string(),
            field: "uid".to_string(),
            target: "user--admin".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_loader_failure_returns_500() {
        let err = IncludeError::Loader(LoaderError::BatchFailed {
            kind: "user".to_string(),
            count: 2,
            message: "timeout".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_preview_errors() {
        let disabled = IncludeError::Preview(PreviewError::Disabled {
            type_name: "node--page".to_string(),
        });
        assert_eq!(disabled.status_code(), StatusCode::BAD_REQUEST);

        let denied = IncludeError::Preview(PreviewError::AccessDenied {
            type_name: "node--page".to_string(),
            id: Uuid::nil(),
            reason: "owner only".to_string(),
        });
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_cancelled_returns_408() {
        assert_eq!(
            IncludeError::Cancelled.status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn test_config_error_returns_500() {
        let err = IncludeError::Config(ConfigError::IoError {
            message: "missing".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let cases = [
            (
                IncludeError::Path(PathError::malformed(",", "empty include path")),
                "MALFORMED_INCLUDE_PATH",
            ),
            (
                IncludeError::Schema(SchemaError::UnknownResourceType {
                    type_name: "node--x".to_string(),
                }),
                "UNKNOWN_RESOURCE_TYPE",
            ),
            (
                IncludeError::Schema(SchemaError::DuplicateResourceType {
                    type_name: "node--x".to_string(),
                }),
                "DUPLICATE_RESOURCE_TYPE",
            ),
            (
                IncludeError::Preview(PreviewError::Disabled {
                    type_name: "node--x".to_string(),
                }),
                "PREVIEW_DISABLED",
            ),
            (
                IncludeError::Config(ConfigError::UnknownPolicy {
                    policy: "admin-only".to_string(),
                }),
                "UNKNOWN_POLICY",
            ),
            (IncludeError::Cancelled, "CANCELLED"),
            (IncludeError::Internal("boom".to_string()), "INTERNAL_ERROR"),
        ];

        for (err, code) in cases {
            assert_eq!(err.error_code(), code, "{}", err);
        }
    }
}

// =============================================================================
// Error Response Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_error_response_has_code_and_message() {
        let err = IncludeError::Schema(SchemaError::InvalidIncludes {
            name: "node--article".to_string(),
            paths: vec!["uid.nope".to_string(), "missing".to_string()],
        });

        let response = err.to_response();

        assert_eq!(response.code, "INVALID_INCLUDES");
        assert_eq!(
            response.message,
            "The include path at uid.nope,missing is invalid for node--article."
        );
    }

    #[test]
    fn test_error_response_includes_details_for_invalid_includes() {
        let err = IncludeError::Schema(SchemaError::InvalidIncludes {
            name: "node--article".to_string(),
            paths: vec!["uid.nope".to_string()],
        });

        let details = err.to_response().details.unwrap();
        assert_eq!(details["resource_type"], "node--article");
        assert_eq!(details["paths"][0], "uid.nope");
    }

    #[test]
    fn test_error_response_includes_details_for_malformed_path() {
        let err = IncludeError::Path(PathError::malformed("a..b", "empty path segment"));

        let details = err.to_response().details.unwrap();
        assert_eq!(details["path"], "a..b");
    }

    #[test]
    fn test_error_response_includes_details_for_preview_access_denied() {
        let id = Uuid::new_v4();
        let err = IncludeError::Preview(PreviewError::AccessDenied {
            type_name: "node--post".to_string(),
            id,
            reason: "owner only".to_string(),
        });

        let details = err.to_response().details.unwrap();
        assert_eq!(details["resource_type"], "node--post");
        assert_eq!(details["id"], id.to_string());
    }

    #[test]
    fn test_cancelled_has_no_details() {
        assert!(IncludeError::Cancelled.to_response().details.is_none());
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_schema_error_converts_to_include_error() {
        let err: IncludeError = SchemaError::UnknownResourceType {
            type_name: "node--x".to_string(),
        }
        .into();

        assert!(matches!(
            err,
            IncludeError::Schema(SchemaError::UnknownResourceType { .. })
        ));
    }

    #[test]
    fn test_serde_yaml_error_converts_to_config_error() {
        let yaml_err = serde_yaml::from_str::<IncludesConfig>("resource_types: 12").unwrap_err();

        let err: IncludeError = yaml_err.into();

        assert!(matches!(
            err,
            IncludeError::Config(ConfigError::ParseError { file: None, .. })
        ));
    }

    #[test]
    fn test_io_error_converts_to_config_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");

        let err: IncludeError = io_err.into();

        assert!(matches!(err, IncludeError::Config(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_anyhow_error_converts_to_internal() {
        let err: IncludeError = anyhow::anyhow!("lock poisoned").into();
        assert!(matches!(err, IncludeError::Internal(ref msg) if msg == "lock poisoned"));
    }
}

// =============================================================================
// Error Pattern Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_can_match_loader_failures() {
        let err = IncludeError::Loader(LoaderError::BatchFailed {
            kind: "user".to_string(),
            count: 3,
            message: "timeout".to_string(),
        });

        let failed_kind = match err {
            IncludeError::Loader(LoaderError::BatchFailed { kind, .. }) => Some(kind),
            _ => None,
        };

        assert_eq!(failed_kind, Some("user".to_string()));
    }

    #[test]
    fn test_can_match_malformed_path() {
        let err = IncludeTree::parse("uid,.x").unwrap_err();

        let path = match err {
            IncludeError::Path(err) => Some(err.path().to_string()),
            _ => None,
        };

        assert_eq!(path.as_deref(), Some(".x"));
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[test]
    fn test_malformed_path_into_response_status() {
        let err = IncludeError::Path(PathError::malformed("a.", "empty path segment"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_preview_access_denied_into_response_status() {
        let err = IncludeError::Preview(PreviewError::AccessDenied {
            type_name: "node--post".to_string(),
            id: Uuid::nil(),
            reason: "nope".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_loader_failure_into_response_status() {
        let err = IncludeError::Loader(LoaderError::BatchFailed {
            kind: "user".to_string(),
            count: 1,
            message: "down".to_string(),
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
