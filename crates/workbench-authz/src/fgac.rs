//! Instance-level resource access control (grants on workspaces,
//! solutions and datasources).
//!
//! Grants on different resources are independent: workspace access does
//! not imply solution access unless it is fanned out explicitly with
//! [`ResourceAccessService::share_workspace`].

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, info, warn};
use workbench_core::error::{WorkbenchError, WorkbenchResult};
use workbench_core::models::access::{
    AccessLevel, GrantAccess, ResourceAccess, ResourceKey, ResourceType,
};
use workbench_core::repository::{ResourceAccessRepository, RoleRepository, UserRepository};

/// Per-solution result of a workspace share fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShareOutcome {
    /// Solutions the user had no access to.
    pub granted: Vec<String>,
    /// Solutions where a weaker grant was raised.
    pub upgraded: Vec<String>,
    /// Solutions left alone because the existing grant is equal or stronger.
    pub skipped: Vec<String>,
}

/// Resource access service.
///
/// Generic over repository implementations so that the access layer
/// has no dependency on the database crate.
pub struct ResourceAccessService<A, U, R>
where
    A: ResourceAccessRepository,
    U: UserRepository,
    R: RoleRepository,
{
    access_repo: A,
    user_repo: U,
    role_repo: R,
}

impl<A, U, R> ResourceAccessService<A, U, R>
where
    A: ResourceAccessRepository,
    U: UserRepository,
    R: RoleRepository,
{
    pub fn new(access_repo: A, user_repo: U, role_repo: R) -> Self {
        Self {
            access_repo,
            user_repo,
            role_repo,
        }
    }

    /// Grant `level` on `resource`, replacing any existing grant for the
    /// pair in a single write.
    pub async fn grant_access(
        &self,
        user_id: &str,
        level: AccessLevel,
        resource: &ResourceKey,
        granted_by: Option<&str>,
    ) -> WorkbenchResult<ResourceAccess> {
        let access = self
            .access_repo
            .upsert(GrantAccess {
                user_id: user_id.to_string(),
                resource: resource.clone(),
                access_level: level,
                granted_by: granted_by.map(str::to_string),
            })
            .await?;
        info!(user_id, %resource, %level, "Granted resource access");
        Ok(access)
    }

    /// Access level a user holds on `resource`, if any.
    ///
    /// An identifier containing `@` is treated as an email and resolved
    /// through the user directory first; an unknown email yields `None`.
    pub async fn check_access(
        &self,
        user_id_or_email: &str,
        resource: &ResourceKey,
    ) -> WorkbenchResult<Option<AccessLevel>> {
        let Some(user_id) = self.resolve_user_id(user_id_or_email).await? else {
            return Ok(None);
        };
        let access = self.access_repo.get(&user_id, resource).await?;
        Ok(access.map(|a| a.access_level))
    }

    /// Does the user hold at least `required` on `resource`?
    pub async fn has_access(
        &self,
        user_id_or_email: &str,
        resource: &ResourceKey,
        required: AccessLevel,
    ) -> WorkbenchResult<bool> {
        let actual = self.check_access(user_id_or_email, resource).await?;
        Ok(actual.is_some_and(|level| level.satisfies(required)))
    }

    /// Remove one user's grant. Returns `false` if there was none.
    pub async fn revoke_access(
        &self,
        user_id: &str,
        resource: &ResourceKey,
    ) -> WorkbenchResult<bool> {
        let removed = self.access_repo.delete(user_id, resource).await?;
        info!(user_id, %resource, removed, "Revoked resource access");
        Ok(removed)
    }

    /// Remove every grant on `resource` and on the resources it owns
    /// (a workspace's solutions). Used when the resource is deleted.
    pub async fn revoke_all(&self, resource: &ResourceKey) -> WorkbenchResult<u64> {
        let deleted = self
            .access_repo
            .delete_by_access_key(&resource.access_key(), &resource.dependent_prefixes())
            .await?;
        info!(%resource, deleted, "Revoked all access to resource");
        Ok(deleted)
    }

    pub async fn list_resource_access(
        &self,
        resource: &ResourceKey,
    ) -> WorkbenchResult<Vec<ResourceAccess>> {
        self.access_repo.list_by_resource(resource).await
    }

    pub async fn list_user_access(
        &self,
        user_id: &str,
        resource_type: Option<ResourceType>,
    ) -> WorkbenchResult<Vec<ResourceAccess>> {
        self.access_repo.list_by_user(user_id, resource_type).await
    }

    /// Owner grants for a newly created resource: the creator and every
    /// member of each administrative role. Returns the users granted.
    pub async fn grant_owner_on_create(
        &self,
        creator_id: &str,
        resource: &ResourceKey,
        admin_roles: &[String],
    ) -> WorkbenchResult<Vec<String>> {
        let mut owners = vec![creator_id.to_string()];
        for role in admin_roles {
            match self.role_repo.get_by_name(role).await {
                Ok(r) => {
                    for user in r.users {
                        if !owners.contains(&user) {
                            owners.push(user);
                        }
                    }
                }
                Err(WorkbenchError::NotFound { .. }) => {
                    warn!(role = %role, "Administrative role not found; skipping");
                }
                Err(e) => return Err(e),
            }
        }

        for owner in &owners {
            self.grant_access(owner, AccessLevel::Owner, resource, Some(creator_id))
                .await?;
        }
        Ok(owners)
    }

    /// Share a workspace and fan editor/owner access out to its solutions.
    ///
    /// For each solution: no grant is granted, a weaker grant is upgraded,
    /// an equal or stronger grant is left untouched. `read_only` access
    /// stays on the workspace only.
    pub async fn share_workspace(
        &self,
        user_id: &str,
        level: AccessLevel,
        workspace_id: &str,
        solution_ids: &[String],
        granted_by: Option<&str>,
    ) -> WorkbenchResult<ShareOutcome> {
        let workspace = ResourceKey::workspace(workspace_id);
        self.grant_access(user_id, level, &workspace, granted_by)
            .await?;

        let mut outcome = ShareOutcome::default();
        if level == AccessLevel::ReadOnly {
            return Ok(outcome);
        }

        for solution_id in solution_ids {
            let solution = ResourceKey::solution(workspace_id, solution_id.as_str());
            let existing = self.access_repo.get(user_id, &solution).await?;
            let bucket = match existing.map(|a| a.access_level.cmp(&level)) {
                None => &mut outcome.granted,
                Some(Ordering::Less) => &mut outcome.upgraded,
                Some(Ordering::Equal | Ordering::Greater) => {
                    debug!(user_id, %solution, "Existing solution grant kept");
                    outcome.skipped.push(solution_id.clone());
                    continue;
                }
            };
            self.grant_access(user_id, level, &solution, granted_by)
                .await?;
            bucket.push(solution_id.clone());
        }
        Ok(outcome)
    }

    async fn resolve_user_id(&self, user_id_or_email: &str) -> WorkbenchResult<Option<String>> {
        if !user_id_or_email.contains('@') {
            return Ok(Some(user_id_or_email.to_string()));
        }
        match self.user_repo.get_by_email(user_id_or_email).await {
            Ok(user) => Ok(Some(user.id)),
            Err(WorkbenchError::NotFound { .. }) => {
                debug!(email = %user_id_or_email, "Unknown email; no access");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
