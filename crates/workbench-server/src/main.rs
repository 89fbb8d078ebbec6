//! Workbench access-control bootstrap.
//!
//! Runs once per deployment: applies schema migrations, checks that the
//! API permission mapping loads, then synchronizes system roles from the
//! role permission mapping.

mod config;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use workbench_authz::sync_system_roles;
use workbench_db::repository::SurrealRoleRepository;
use workbench_db::{DbManager, run_migrations};

use crate::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("workbench=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting workbench access bootstrap...");

    let settings = Settings::from_env()?;

    // Fail before touching the database if either mapping is unusable.
    let api_permissions = settings
        .authz
        .load_api_permissions()
        .context("load API permission mapping")?;
    let role_mapping = settings
        .authz
        .load_role_mapping()
        .context("load role permission mapping")?;

    let db = DbManager::connect(&settings.db)
        .await
        .context("connect to SurrealDB")?;
    run_migrations(db.client())
        .await
        .context("run schema migrations")?;

    let roles = SurrealRoleRepository::new(db.client().clone());
    let synced = sync_system_roles(&roles, &role_mapping, &settings.updated_by)
        .await
        .context("synchronize system roles")?;

    tracing::info!(
        routes = api_permissions.len(),
        roles = synced.len(),
        admin_roles = ?settings.authz.admin_roles,
        "Workbench access bootstrap complete"
    );
    Ok(())
}
