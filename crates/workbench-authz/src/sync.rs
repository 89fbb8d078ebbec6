//! Role synchronization (run once per deployment) and role membership.

use tracing::info;
use workbench_core::error::WorkbenchResult;
use workbench_core::models::role::{Role, SyncRole};
use workbench_core::repository::RoleRepository;

use crate::config::RoleMapping;

/// Upsert every role in `mapping` in role-name order.
///
/// Permissions are overwritten, creation time is kept for existing roles
/// and members are untouched. The first failing role aborts the sync.
pub async fn sync_system_roles<R: RoleRepository>(
    roles: &R,
    mapping: &RoleMapping,
    updated_by: &str,
) -> WorkbenchResult<Vec<Role>> {
    let mut synced = Vec::with_capacity(mapping.len());
    for (name, permissions) in mapping.iter() {
        let role = roles
            .upsert_permissions(SyncRole {
                name: name.clone(),
                permissions: permissions.clone(),
                updated_by: updated_by.to_string(),
            })
            .await?;
        info!(role = %name, permissions = permissions.len(), "Synchronized role");
        synced.push(role);
    }
    info!(roles = synced.len(), "Role synchronization complete");
    Ok(synced)
}

/// Move a user from `from` (if any) to `to`. The target role must exist.
pub async fn reassign_user_role<R: RoleRepository>(
    roles: &R,
    user_id: &str,
    from: Option<&str>,
    to: &str,
) -> WorkbenchResult<Role> {
    // Verify the target first so a failed move never leaves the user roleless.
    roles.get_by_name(to).await?;
    if let Some(from) = from
        && from != to
    {
        roles.remove_user(from, user_id).await?;
    }
    let role = roles.add_user(to, user_id).await?;
    info!(user_id, from = ?from, to, "Reassigned user role");
    Ok(role)
}
