//! Integration tests for role synchronization against in-memory SurrealDB.

use std::sync::Mutex;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use workbench_authz::{RoleMapping, reassign_user_role, sync_system_roles};
use workbench_core::error::{WorkbenchError, WorkbenchResult};
use workbench_core::models::role::{Role, SyncRole};
use workbench_core::repository::{PaginatedResult, Pagination, RoleRepository};
use workbench_db::repository::SurrealRoleRepository;

async fn setup() -> SurrealRoleRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    workbench_db::run_migrations(&db).await.unwrap();
    SurrealRoleRepository::new(db)
}

fn mapping(json: &str) -> RoleMapping {
    RoleMapping::from_json_str(json).unwrap()
}

#[tokio::test]
async fn sync_creates_every_role_in_name_order() {
    let roles = setup().await;
    let synced = sync_system_roles(
        &roles,
        &mapping(r#"{"ITAdmin": ["Users.fullaccess"], "Default": ["Workspace.view"]}"#),
        "provisioner",
    )
    .await
    .unwrap();

    let names: Vec<&str> = synced.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Default", "ITAdmin"]);

    let admin = roles.get_by_name("ITAdmin").await.unwrap();
    assert_eq!(admin.permissions, vec!["Users.fullaccess".to_string()]);
    assert_eq!(admin.last_updated_by.as_deref(), Some("provisioner"));
}

#[tokio::test]
async fn resync_overwrites_permissions_and_keeps_creation_time() {
    let roles = setup().await;
    sync_system_roles(&roles, &mapping(r#"{"Default": ["Workspace.view"]}"#), "v1")
        .await
        .unwrap();
    let before = roles.get_by_name("Default").await.unwrap();
    roles.add_user("Default", "u-1").await.unwrap();

    sync_system_roles(
        &roles,
        &mapping(r#"{"Default": ["Workspace.manage", "Solution.view"]}"#),
        "v2",
    )
    .await
    .unwrap();
    let after = roles.get_by_name("Default").await.unwrap();

    assert_eq!(after.created_at, before.created_at);
    assert_eq!(
        after.permissions,
        vec!["Workspace.manage".to_string(), "Solution.view".to_string()]
    );
    assert_eq!(after.last_updated_by.as_deref(), Some("v2"));
    assert!(after.has_member("u-1"));
}

#[tokio::test]
async fn reassign_moves_membership() {
    let roles = setup().await;
    sync_system_roles(
        &roles,
        &mapping(r#"{"Default": [], "ITAdmin": []}"#),
        "test",
    )
    .await
    .unwrap();
    roles.add_user("Default", "u-1").await.unwrap();

    reassign_user_role(&roles, "u-1", Some("Default"), "ITAdmin")
        .await
        .unwrap();

    assert!(!roles.get_by_name("Default").await.unwrap().has_member("u-1"));
    assert!(roles.get_by_name("ITAdmin").await.unwrap().has_member("u-1"));
}

#[tokio::test]
async fn reassign_to_unknown_role_leaves_membership_intact() {
    let roles = setup().await;
    sync_system_roles(&roles, &mapping(r#"{"Default": []}"#), "test")
        .await
        .unwrap();
    roles.add_user("Default", "u-1").await.unwrap();

    let err = reassign_user_role(&roles, "u-1", Some("Default"), "Ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkbenchError::NotFound { .. }));
    assert!(roles.get_by_name("Default").await.unwrap().has_member("u-1"));
}

/// Role store whose upsert fails for one role name and records every
/// upsert it was asked to perform.
struct FailingRoles {
    inner: SurrealRoleRepository<Db>,
    fail_on: &'static str,
    attempted: Mutex<Vec<String>>,
}

impl RoleRepository for FailingRoles {
    async fn get_by_name(&self, name: &str) -> WorkbenchResult<Role> {
        self.inner.get_by_name(name).await
    }

    async fn upsert_permissions(&self, input: SyncRole) -> WorkbenchResult<Role> {
        self.attempted.lock().unwrap().push(input.name.clone());
        if input.name == self.fail_on {
            return Err(WorkbenchError::Database("write rejected".into()));
        }
        self.inner.upsert_permissions(input).await
    }

    async fn add_user(&self, name: &str, user_id: &str) -> WorkbenchResult<Role> {
        self.inner.add_user(name, user_id).await
    }

    async fn remove_user(&self, name: &str, user_id: &str) -> WorkbenchResult<Role> {
        self.inner.remove_user(name, user_id).await
    }

    async fn delete(&self, name: &str) -> WorkbenchResult<()> {
        self.inner.delete(name).await
    }

    async fn list(&self, pagination: Pagination) -> WorkbenchResult<PaginatedResult<Role>> {
        self.inner.list(pagination).await
    }
}

#[tokio::test]
async fn sync_stops_at_first_failing_role() {
    let roles = FailingRoles {
        inner: setup().await,
        fail_on: "Beta",
        attempted: Mutex::new(Vec::new()),
    };

    let err = sync_system_roles(
        &roles,
        &mapping(r#"{"Gamma": ["C.view"], "Alpha": ["A.view"], "Beta": ["B.view"]}"#),
        "test",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkbenchError::Database(_)));

    assert_eq!(
        *roles.attempted.lock().unwrap(),
        vec!["Alpha".to_string(), "Beta".to_string()]
    );
    assert!(roles.inner.get_by_name("Alpha").await.is_ok());
    assert!(matches!(
        roles.inner.get_by_name("Gamma").await,
        Err(WorkbenchError::NotFound { .. })
    ));
}
