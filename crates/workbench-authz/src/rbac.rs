//! Endpoint-level role-based access control.

use std::collections::HashMap;

use tracing::{debug, info, warn};
use workbench_core::error::{WorkbenchError, WorkbenchResult};
use workbench_core::models::permission::{PermissionEntry, PermissionLevel};
use workbench_core::repository::RoleRepository;

use crate::config::ApiPermissionMap;
use crate::decision::{AccessDecision, Denial, InsufficientPermission};

/// Decides whether a role may invoke an API route.
///
/// Generic over the role repository; the API permission mapping is an
/// immutable value supplied at construction.
pub struct RbacEvaluator<R: RoleRepository> {
    roles: R,
    api_permissions: ApiPermissionMap,
}

impl<R: RoleRepository> RbacEvaluator<R> {
    pub fn new(roles: R, api_permissions: ApiPermissionMap) -> Self {
        Self {
            roles,
            api_permissions,
        }
    }

    pub fn api_permissions(&self) -> &ApiPermissionMap {
        &self.api_permissions
    }

    /// Check `(user_id, role)` against the requirements of
    /// `(resource, method)`.
    ///
    /// Unmapped routes are denied. Every required permission is checked
    /// so the reason lists all gaps, not just the first.
    pub async fn is_action_valid(
        &self,
        user_id: &str,
        role: &str,
        resource: &str,
        method: &str,
    ) -> WorkbenchResult<AccessDecision> {
        // 1. Role must exist.
        let role_record = match self.roles.get_by_name(role).await {
            Ok(r) => r,
            Err(WorkbenchError::NotFound { .. }) => {
                info!(user_id, role, "Role not found");
                return Ok(AccessDecision::deny(Denial::RoleNotFound {
                    role: role.to_string(),
                }));
            }
            Err(e) => return Err(e),
        };

        // 2. The role claim must be backed by a membership record.
        if !role_record.has_member(user_id) {
            info!(user_id, role, "User is not a member of the claimed role");
            return Ok(AccessDecision::deny(Denial::UserNotInRole {
                user_id: user_id.to_string(),
                role: role.to_string(),
            }));
        }

        // 3. Fail closed on unmapped routes.
        let Some(required) = self.api_permissions.required(resource, method) else {
            info!(resource, method, "No API permission mapping for route");
            return Ok(AccessDecision::deny(Denial::NoMappingFound {
                resource: resource.to_string(),
                method: method.to_string(),
            }));
        };

        // 4. A route with a malformed requirement is never satisfiable.
        if !required.is_satisfiable() {
            warn!(resource, method, "Route has malformed permission requirements");
            return Ok(AccessDecision::deny(Denial::MalformedRequirement {
                resource: resource.to_string(),
                method: method.to_string(),
                entries: required.malformed.clone(),
            }));
        }

        // 5. Compare every requirement against the role's grants.
        let (missing, insufficient) =
            evaluate_permissions(&required.permissions, &role_record.permissions);
        if missing.is_empty() && insufficient.is_empty() {
            debug!(user_id, role, resource, method, "Action allowed");
            return Ok(AccessDecision::allow());
        }

        info!(
            user_id,
            role,
            resource,
            method,
            missing = missing.len(),
            insufficient = insufficient.len(),
            "Action denied"
        );
        Ok(AccessDecision::deny(Denial::Permissions {
            missing,
            insufficient,
        }))
    }
}

/// Compare required permissions against raw granted entries.
///
/// Malformed granted entries are logged and skipped. When a key is
/// granted more than once the strongest level counts. Returns the keys
/// with no grant and the grants that rank below the requirement.
pub fn evaluate_permissions(
    required: &[PermissionEntry],
    granted: &[String],
) -> (Vec<String>, Vec<InsufficientPermission>) {
    let mut strongest: HashMap<String, PermissionLevel> = HashMap::new();
    for raw in granted {
        match PermissionEntry::parse(raw) {
            Ok(entry) => {
                strongest
                    .entry(entry.key)
                    .and_modify(|level| *level = (*level).max(entry.level))
                    .or_insert(entry.level);
            }
            Err(_) => warn!(entry = %raw, "Skipping malformed permission entry"),
        }
    }

    let mut missing = Vec::new();
    let mut insufficient = Vec::new();
    for req in required {
        match strongest.get(&req.key) {
            None => missing.push(req.key.clone()),
            Some(granted) if granted.rank() < req.level.rank() => {
                insufficient.push(InsufficientPermission {
                    key: req.key.clone(),
                    required: req.level,
                    granted: *granted,
                });
            }
            Some(_) => {}
        }
    }
    (missing, insufficient)
}
