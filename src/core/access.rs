//! Access checks applied while resolving includes
//!
//! Denials are data: a failed check yields an [`AccessResult::Denied`] or a
//! [`ResourceEntry::Denied`], never an error.

use crate::config::IncludesConfig;
use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::error::IncludeResult;
use crate::core::resource::{AccessFailure, ResourceEntry, ResourceObject};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of a field-level check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult {
    Allowed,
    Denied { reason: String },
}

impl AccessResult {
    pub fn denied(reason: impl Into<String>) -> Self {
        AccessResult::Denied {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessResult::Allowed)
    }
}

/// Field and resource access checks for one caller
pub trait AccessChecker: Send + Sync {
    /// May the caller view `field` of `resource`?
    fn check_field(&self, resource: &ResourceObject, field: &str) -> AccessResult;

    /// Wrap a resource according to what the caller may see of it
    fn check_resource(&self, resource: Arc<ResourceObject>) -> ResourceEntry;
}

/// Checker that allows everything (for development and trusted callers)
pub struct AllowAllAccessChecker;

impl AccessChecker for AllowAllAccessChecker {
    fn check_field(&self, _: &ResourceObject, _: &str) -> AccessResult {
        AccessResult::Allowed
    }

    fn check_resource(&self, resource: Arc<ResourceObject>) -> ResourceEntry {
        ResourceEntry::Resource(resource)
    }
}

#[derive(Debug, Clone)]
struct NamedPolicy {
    name: String,
    policy: AuthPolicy,
}

impl NamedPolicy {
    fn parse(name: &str) -> IncludeResult<Self> {
        Ok(Self {
            name: name.to_string(),
            policy: AuthPolicy::parse_policy(name)?,
        })
    }
}

#[derive(Debug, Clone)]
struct ResourcePolicies {
    view: NamedPolicy,
    view_label: Option<NamedPolicy>,
}

/// Checker evaluating configured policies against one [`AuthContext`]
///
/// Types and fields without a configured policy are public.
#[derive(Debug, Clone)]
pub struct PolicyAccessChecker {
    context: AuthContext,
    /// Maps type name -> resource policies
    resources: HashMap<String, ResourcePolicies>,
    /// Maps type name -> field name -> view policy
    fields: HashMap<String, HashMap<String, NamedPolicy>>,
}

impl PolicyAccessChecker {
    pub fn new(context: AuthContext) -> Self {
        Self {
            context,
            resources: HashMap::new(),
            fields: HashMap::new(),
        }
    }

    /// Collect the policies declared in a configuration document
    ///
    /// Fails with `ConfigError::UnknownPolicy` on the first policy name
    /// that does not parse.
    pub fn from_config(config: &IncludesConfig, context: AuthContext) -> IncludeResult<Self> {
        config
            .resource_types
            .iter()
            .try_fold(Self::new(context), |checker, resource_type| {
                let type_name = resource_type.type_name();
                let checker = checker.with_resource_policy(
                    &type_name,
                    &resource_type.access.view,
                    resource_type.access.view_label.as_deref(),
                )?;
                resource_type
                    .fields
                    .iter()
                    .filter_map(|field| field.view.as_deref().map(|view| (&field.name, view)))
                    .try_fold(checker, |checker, (field, view)| {
                        checker.with_field_policy(&type_name, field, view)
                    })
            })
    }

    pub fn with_resource_policy(
        mut self,
        type_name: &str,
        view: &str,
        view_label: Option<&str>,
    ) -> IncludeResult<Self> {
        let policies = ResourcePolicies {
            view: NamedPolicy::parse(view)?,
            view_label: view_label.map(NamedPolicy::parse).transpose()?,
        };
        self.resources.insert(type_name.to_string(), policies);
        Ok(self)
    }

    pub fn with_field_policy(
        mut self,
        type_name: &str,
        field: &str,
        view: &str,
    ) -> IncludeResult<Self> {
        let policy = NamedPolicy::parse(view)?;
        self.fields
            .entry(type_name.to_string())
            .or_default()
            .insert(field.to_string(), policy);
        Ok(self)
    }

    pub fn context(&self) -> &AuthContext {
        &self.context
    }
}

impl AccessChecker for PolicyAccessChecker {
    fn check_field(&self, resource: &ResourceObject, field: &str) -> AccessResult {
        let Some(policy) = self
            .fields
            .get(&resource.type_name())
            .and_then(|fields| fields.get(field))
        else {
            return AccessResult::Allowed;
        };

        if policy.policy.allows(&self.context, Some(resource.identity())) {
            AccessResult::Allowed
        } else {
            AccessResult::denied(format!(
                "The '{}' policy is required to view the '{}' field.",
                policy.name, field
            ))
        }
    }

    fn check_resource(&self, resource: Arc<ResourceObject>) -> ResourceEntry {
        let Some(policies) = self.resources.get(&resource.type_name()) else {
            return ResourceEntry::Resource(resource);
        };

        if policies.view.policy.allows(&self.context, Some(resource.identity())) {
            return ResourceEntry::Resource(resource);
        }

        let label_allowed = policies
            .view_label
            .as_ref()
            .is_some_and(|label| label.policy.allows(&self.context, Some(resource.identity())));
        if label_allowed {
            return ResourceEntry::LabelOnly(resource);
        }

        let reason = format!(
            "The '{}' policy is required to view {}.",
            policies.view.name,
            resource.type_name()
        );
        ResourceEntry::Denied(AccessFailure::for_resource(&resource, reason))
    }
}
