//! Integration tests for the resource access service against in-memory
//! SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use workbench_authz::{ResourceAccessService, ShareOutcome};
use workbench_core::models::access::{AccessLevel, ResourceKey, ResourceType};
use workbench_core::models::role::SyncRole;
use workbench_core::models::user::CreateUser;
use workbench_core::repository::{RoleRepository, UserRepository};
use workbench_db::repository::{
    SurrealResourceAccessRepository, SurrealRoleRepository, SurrealUserRepository,
};

type Service = ResourceAccessService<
    SurrealResourceAccessRepository<Db>,
    SurrealUserRepository<Db>,
    SurrealRoleRepository<Db>,
>;

/// Spin up in-memory DB, run migrations, create user alice and an
/// `ITAdmin` role with two members.
async fn setup() -> Service {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    workbench_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    users
        .create(CreateUser {
            id: "alice".into(),
            email: "alice@example.com".into(),
            display_name: "Alice".into(),
        })
        .await
        .unwrap();

    let roles = SurrealRoleRepository::new(db.clone());
    roles
        .upsert_permissions(SyncRole {
            name: "ITAdmin".into(),
            permissions: vec!["Workspace.fullaccess".into()],
            updated_by: "test".into(),
        })
        .await
        .unwrap();
    roles.add_user("ITAdmin", "admin-1").await.unwrap();
    roles.add_user("ITAdmin", "admin-2").await.unwrap();

    ResourceAccessService::new(SurrealResourceAccessRepository::new(db), users, roles)
}

#[tokio::test]
async fn grant_then_check_reads_back_level() {
    let service = setup().await;
    let ws = ResourceKey::workspace("w1");

    assert_eq!(service.check_access("alice", &ws).await.unwrap(), None);

    service
        .grant_access("alice", AccessLevel::Editor, &ws, Some("admin-1"))
        .await
        .unwrap();
    for _ in 0..2 {
        assert_eq!(
            service.check_access("alice", &ws).await.unwrap(),
            Some(AccessLevel::Editor)
        );
    }
}

#[tokio::test]
async fn email_identifiers_resolve_through_directory() {
    let service = setup().await;
    let ds = ResourceKey::datasource("d1");
    service
        .grant_access("alice", AccessLevel::ReadOnly, &ds, None)
        .await
        .unwrap();

    assert_eq!(
        service.check_access("Alice@Example.com", &ds).await.unwrap(),
        Some(AccessLevel::ReadOnly)
    );
    assert_eq!(
        service.check_access("stranger@example.com", &ds).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn has_access_compares_ranks() {
    let service = setup().await;
    let sol = ResourceKey::solution("w1", "s1");
    service
        .grant_access("alice", AccessLevel::Editor, &sol, None)
        .await
        .unwrap();

    assert!(service.has_access("alice", &sol, AccessLevel::ReadOnly).await.unwrap());
    assert!(service.has_access("alice", &sol, AccessLevel::Editor).await.unwrap());
    assert!(!service.has_access("alice", &sol, AccessLevel::Owner).await.unwrap());
    assert!(!service.has_access("bob", &sol, AccessLevel::ReadOnly).await.unwrap());
}

#[tokio::test]
async fn workspace_access_does_not_imply_solution_access() {
    let service = setup().await;
    service
        .grant_access("alice", AccessLevel::Owner, &ResourceKey::workspace("w1"), None)
        .await
        .unwrap();

    let sol = ResourceKey::solution("w1", "s1");
    assert_eq!(service.check_access("alice", &sol).await.unwrap(), None);
}

#[tokio::test]
async fn owner_grants_on_create_cover_creator_and_admins() {
    let service = setup().await;
    let ws = ResourceKey::workspace("w1");

    let owners = service
        .grant_owner_on_create("alice", &ws, &["ITAdmin".into(), "MissingRole".into()])
        .await
        .unwrap();
    assert_eq!(owners, vec!["alice", "admin-1", "admin-2"]);

    let grants = service.list_resource_access(&ws).await.unwrap();
    assert_eq!(grants.len(), 3);
    assert!(grants.iter().all(|g| g.access_level == AccessLevel::Owner));
    assert!(grants.iter().all(|g| g.granted_by.as_deref() == Some("alice")));
}

#[tokio::test]
async fn share_workspace_never_downgrades() {
    let service = setup().await;
    let solutions: Vec<String> = vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()];

    service
        .grant_access("bob", AccessLevel::Owner, &ResourceKey::solution("w1", "s2"), None)
        .await
        .unwrap();
    service
        .grant_access("bob", AccessLevel::ReadOnly, &ResourceKey::solution("w1", "s3"), None)
        .await
        .unwrap();
    service
        .grant_access("bob", AccessLevel::Editor, &ResourceKey::solution("w1", "s4"), None)
        .await
        .unwrap();

    let outcome = service
        .share_workspace("bob", AccessLevel::Editor, "w1", &solutions, Some("alice"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ShareOutcome {
            granted: vec!["s1".into()],
            upgraded: vec!["s3".into()],
            skipped: vec!["s2".into(), "s4".into()],
        }
    );

    for (solution, expected) in [
        ("s1", AccessLevel::Editor),
        ("s2", AccessLevel::Owner),
        ("s3", AccessLevel::Editor),
    ] {
        let actual = service
            .check_access("bob", &ResourceKey::solution("w1", solution))
            .await
            .unwrap();
        assert_eq!(actual, Some(expected), "solution {solution}");
    }
    assert_eq!(
        service.check_access("bob", &ResourceKey::workspace("w1")).await.unwrap(),
        Some(AccessLevel::Editor)
    );
}

#[tokio::test]
async fn read_only_share_stays_on_workspace() {
    let service = setup().await;
    let outcome = service
        .share_workspace("bob", AccessLevel::ReadOnly, "w1", &["s1".into()], None)
        .await
        .unwrap();
    assert_eq!(outcome, ShareOutcome::default());
    assert_eq!(
        service
            .check_access("bob", &ResourceKey::solution("w1", "s1"))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn revoke_single_and_cascading() {
    let service = setup().await;
    let w1 = ResourceKey::workspace("w1");
    service
        .grant_owner_on_create("alice", &w1, &[])
        .await
        .unwrap();
    service
        .grant_access("bob", AccessLevel::Editor, &w1, None)
        .await
        .unwrap();
    service
        .grant_access("bob", AccessLevel::Editor, &ResourceKey::solution("w1", "s1"), None)
        .await
        .unwrap();
    service
        .grant_access("bob", AccessLevel::Editor, &ResourceKey::workspace("w2"), None)
        .await
        .unwrap();

    assert!(service.revoke_access("bob", &w1).await.unwrap());
    assert!(!service.revoke_access("bob", &w1).await.unwrap());

    let deleted = service.revoke_all(&w1).await.unwrap();
    assert_eq!(deleted, 2);

    let remaining = service
        .list_user_access("bob", Some(ResourceType::Workspace))
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].resource, ResourceKey::workspace("w2"));
    assert!(service.list_resource_access(&w1).await.unwrap().is_empty());
}
