//! Authorization context and policies
//!
//! Policies are declared as strings in configuration and evaluated against
//! the context of the caller on whose behalf includes are resolved:
//! - User authentication
//! - Owner-based access
//! - Service-to-service
//! - Admin access

use crate::core::error::ConfigError;
use crate::core::resource::ResourceIdentity;
use uuid::Uuid;

/// Authorization context of the caller
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Authenticated user
    User {
        user_id: Uuid,
        tenant_id: Uuid,
        roles: Vec<String>,
    },

    /// Owner of a specific resource
    Owner {
        user_id: Uuid,
        tenant_id: Uuid,
        resource_id: Uuid,
        resource_type: String,
    },

    /// Service-to-service communication
    Service {
        service_name: String,
        tenant_id: Option<Uuid>,
    },

    /// System administrator
    Admin { admin_id: Uuid },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Check if context represents an admin
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    /// Check if context represents a service
    pub fn is_service(&self) -> bool {
        matches!(self, AuthContext::Service { .. })
    }

    /// Whether the context owns the given resource
    pub fn owns(&self, target: &ResourceIdentity) -> bool {
        match self {
            AuthContext::Owner {
                resource_id,
                resource_type,
                ..
            } => *resource_id == target.id && *resource_type == target.kind,
            _ => false,
        }
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated user
    Authenticated,

    /// Owner of the resource only
    Owner,

    /// User must have one of these roles
    HasRole(Vec<String>),

    /// Service-to-service only
    ServiceOnly,

    /// Admin only
    AdminOnly,

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    ///
    /// Without a target resource, `Owner` is satisfied by any owner context.
    pub fn check(&self, context: &AuthContext) -> bool {
        self.allows(context, None)
    }

    /// Check the policy for an operation on a specific resource
    pub fn allows(&self, context: &AuthContext, target: Option<&ResourceIdentity>) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !matches!(context, AuthContext::Anonymous),

            AuthPolicy::Owner => match target {
                Some(target) => context.owns(target),
                None => matches!(context, AuthContext::Owner { .. }),
            },

            AuthPolicy::HasRole(required_roles) => match context {
                AuthContext::User { roles, .. } => required_roles.iter().any(|r| roles.contains(r)),
                _ => false,
            },

            AuthPolicy::ServiceOnly => context.is_service(),

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::And(policies) => policies.iter().all(|p| p.allows(context, target)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.allows(context, target)),
        }
    }

    /// Parse policy from string (for YAML config)
    ///
    /// Unknown names are an error, never a default policy.
    pub fn parse_policy(s: &str) -> Result<Self, ConfigError> {
        let unknown = || ConfigError::UnknownPolicy {
            policy: s.to_string(),
        };
        if let Some(role) = s.strip_prefix("owner_or_role:") {
            if role.is_empty() {
                return Err(unknown());
            }
            return Ok(AuthPolicy::Or(vec![
                AuthPolicy::Owner,
                AuthPolicy::HasRole(vec![role.to_string()]),
            ]));
        }
        if let Some(role) = s.strip_prefix("role:") {
            if role.is_empty() {
                return Err(unknown());
            }
            return Ok(AuthPolicy::HasRole(vec![role.to_string()]));
        }
        match s {
            "public" => Ok(AuthPolicy::Public),
            "authenticated" => Ok(AuthPolicy::Authenticated),
            "owner" => Ok(AuthPolicy::Owner),
            "service_only" => Ok(AuthPolicy::ServiceOnly),
            "admin_only" => Ok(AuthPolicy::AdminOnly),
            _ => Err(unknown()),
        }
    }
}
