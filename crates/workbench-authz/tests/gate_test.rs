//! End-to-end tests for the access gate (RBAC then FGAC) against
//! in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use workbench_authz::{
    AccessGate, ApiPermissionMap, AuthzRequest, Denial, RbacEvaluator, ResourceAccessService,
    RoleMapping, TargetAccess, sync_system_roles,
};
use workbench_core::models::access::{AccessLevel, ResourceKey};
use workbench_core::repository::RoleRepository;
use workbench_db::repository::{
    SurrealResourceAccessRepository, SurrealRoleRepository, SurrealUserRepository,
};

type Gate = AccessGate<
    SurrealRoleRepository<Db>,
    SurrealResourceAccessRepository<Db>,
    SurrealUserRepository<Db>,
>;

async fn setup() -> Gate {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    workbench_db::run_migrations(&db).await.unwrap();

    let roles = SurrealRoleRepository::new(db.clone());
    let mapping = RoleMapping::from_json_str(
        r#"{"Default": ["Workspace.view"], "ITAdmin": ["Workspace.fullaccess"]}"#,
    )
    .unwrap();
    sync_system_roles(&roles, &mapping, "test").await.unwrap();
    roles.add_user("Default", "alice").await.unwrap();
    roles.add_user("ITAdmin", "root").await.unwrap();

    let api = ApiPermissionMap::from_json_str(
        r#"{"/workspaces/{id}": {"GET": ["Workspace.view"], "DELETE": ["Workspace.fullaccess"]}}"#,
    )
    .unwrap();

    let rbac = RbacEvaluator::new(roles.clone(), api);
    let fgac = ResourceAccessService::new(
        SurrealResourceAccessRepository::new(db.clone()),
        SurrealUserRepository::new(db),
        roles,
    );
    AccessGate::new(rbac, fgac)
}

fn request(user_id: &str, role: &str, method: &str, target: Option<TargetAccess>) -> AuthzRequest {
    AuthzRequest {
        user_id: user_id.into(),
        role: role.into(),
        resource: "/workspaces/{id}".into(),
        method: method.into(),
        target,
    }
}

fn read(workspace_id: &str) -> Option<TargetAccess> {
    Some(TargetAccess {
        resource: ResourceKey::workspace(workspace_id),
        required: AccessLevel::ReadOnly,
    })
}

#[tokio::test]
async fn route_allowed_but_no_instance_grant_is_denied() {
    let gate = setup().await;

    let decision = gate
        .authorize(&request("alice", "Default", "GET", read("w1")))
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert!(matches!(
        decision.denial,
        Some(Denial::ResourceAccess { actual: None, .. })
    ));
}

#[tokio::test]
async fn route_and_instance_grant_allow() {
    let gate = setup().await;
    gate.fgac()
        .grant_access("alice", AccessLevel::ReadOnly, &ResourceKey::workspace("w1"), None)
        .await
        .unwrap();

    let decision = gate
        .authorize(&request("alice", "Default", "GET", read("w1")))
        .await
        .unwrap();
    assert!(decision.allowed, "{}", decision.reason);

    let decision = gate
        .authorize(&request("alice", "Default", "GET", read("w2")))
        .await
        .unwrap();
    assert!(!decision.allowed);
}

#[tokio::test]
async fn rbac_denial_short_circuits_fgac() {
    let gate = setup().await;
    gate.fgac()
        .grant_access("alice", AccessLevel::Owner, &ResourceKey::workspace("w1"), None)
        .await
        .unwrap();

    let decision = gate
        .authorize(&request("alice", "Default", "DELETE", read("w1")))
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert!(matches!(decision.denial, Some(Denial::Permissions { .. })));
}

#[tokio::test]
async fn insufficient_instance_level_reports_actual() {
    let gate = setup().await;
    gate.fgac()
        .grant_access("root", AccessLevel::Editor, &ResourceKey::workspace("w1"), None)
        .await
        .unwrap();

    let target = Some(TargetAccess {
        resource: ResourceKey::workspace("w1"),
        required: AccessLevel::Owner,
    });
    let decision = gate
        .authorize(&request("root", "ITAdmin", "DELETE", target))
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert!(matches!(
        decision.denial,
        Some(Denial::ResourceAccess {
            actual: Some(AccessLevel::Editor),
            ..
        })
    ));
}

#[tokio::test]
async fn route_only_request_skips_fgac() {
    let gate = setup().await;
    let decision = gate
        .authorize(&request("root", "ITAdmin", "DELETE", None))
        .await
        .unwrap();
    assert!(decision.allowed);
}
