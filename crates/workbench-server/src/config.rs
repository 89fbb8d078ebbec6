use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use workbench_authz::AuthzConfig;
use workbench_db::DbConfig;

/// Server settings sourced from `WORKBENCH_*` environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db: DbConfig,
    pub authz: AuthzConfig,
    /// Recorded as `last_updated_by` on synchronized roles.
    pub updated_by: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut db = DbConfig::default();
        if let Some(url) = lookup("WORKBENCH_DB_URL") {
            db.url = url;
        }
        if let Some(namespace) = lookup("WORKBENCH_DB_NAMESPACE") {
            db.namespace = namespace;
        }
        if let Some(database) = lookup("WORKBENCH_DB_DATABASE") {
            db.database = database;
        }
        if let Some(username) = lookup("WORKBENCH_DB_USER") {
            db.username = username;
        }
        if let Some(password) = lookup("WORKBENCH_DB_PASSWORD") {
            db.password = password;
        }

        let mut authz = AuthzConfig::default();
        if let Some(path) = lookup("WORKBENCH_API_PERMISSIONS") {
            authz.api_permissions_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("WORKBENCH_ROLE_PERMISSIONS") {
            authz.role_permissions_path = PathBuf::from(path);
        }
        if let Some(roles) = lookup("WORKBENCH_ADMIN_ROLES") {
            authz.admin_roles = parse_list(&roles);
        }

        let updated_by = lookup("WORKBENCH_UPDATED_BY")
            .unwrap_or_else(|| format!("workbench-server/{}", env!("CARGO_PKG_VERSION")));
        if updated_by.trim().is_empty() {
            bail!("WORKBENCH_UPDATED_BY must not be empty");
        }

        let settings = Self {
            db,
            authz,
            updated_by,
        };
        settings.validate().context("validate settings")?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.db.url.trim().is_empty() {
            bail!("WORKBENCH_DB_URL must not be empty");
        }
        if self.db.namespace.trim().is_empty() || self.db.database.trim().is_empty() {
            bail!("database namespace and name must not be empty");
        }
        Ok(())
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
