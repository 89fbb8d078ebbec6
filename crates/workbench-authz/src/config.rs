//! Access-control configuration and the two static JSON artifacts.
//!
//! API permission mapping:
//!
//! ```json
//! { "/workspaces": { "GET": ["Workspace.view"], "POST": ["Workspace.manage"] } }
//! ```
//!
//! Role permission mapping:
//!
//! ```json
//! { "ITAdmin": ["Users.fullaccess"], "Default": ["Workspace.view"] }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use workbench_core::models::permission::PermissionEntry;

use crate::error::AuthzError;

/// Configuration for the access-control layer.
#[derive(Debug, Clone)]
pub struct AuthzConfig {
    /// Path of the API permission mapping document.
    pub api_permissions_path: PathBuf,
    /// Path of the role permission mapping document.
    pub role_permissions_path: PathBuf,
    /// Roles whose members receive owner access on every new resource.
    pub admin_roles: Vec<String>,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            api_permissions_path: PathBuf::from("config/api_permissions.json"),
            role_permissions_path: PathBuf::from("config/role_permissions.json"),
            admin_roles: vec!["ITAdmin".into()],
        }
    }
}

impl AuthzConfig {
    pub fn load_api_permissions(&self) -> Result<ApiPermissionMap, AuthzError> {
        ApiPermissionMap::from_path(&self.api_permissions_path)
    }

    pub fn load_role_mapping(&self) -> Result<RoleMapping, AuthzError> {
        RoleMapping::from_path(&self.role_permissions_path)
    }
}

fn read(path: &Path) -> Result<String, AuthzError> {
    fs::read_to_string(path).map_err(|source| AuthzError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Requirements of one `(resource, method)` route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequirements {
    pub permissions: Vec<PermissionEntry>,
    /// Entries that failed to parse. A route with any of these can never
    /// be satisfied.
    pub malformed: Vec<String>,
}

impl RouteRequirements {
    pub fn is_satisfiable(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Immutable `(resource, method) → required permissions` lookup.
///
/// A malformed requirement is logged and poisons only its own route, so
/// that route is denied while the rest of the mapping stays usable.
#[derive(Debug, Clone, Default)]
pub struct ApiPermissionMap {
    routes: HashMap<(String, String), RouteRequirements>,
}

impl ApiPermissionMap {
    pub fn from_path(path: &Path) -> Result<Self, AuthzError> {
        let map = Self::from_json_str(&read(path)?)?;
        info!(path = %path.display(), routes = map.len(), "Loaded API permission mapping");
        Ok(map)
    }

    /// Parse a mapping document. Two entries that normalize to the same
    /// route (`"GET"` and `"get"` on one path) are rejected.
    pub fn from_json_str(json: &str) -> Result<Self, AuthzError> {
        let raw: BTreeMap<String, BTreeMap<String, Vec<String>>> = serde_json::from_str(json)?;
        let mut map = Self::default();
        for (resource, methods) in raw {
            for (method, entries) in methods {
                let key = Self::route_key(&resource, &method);
                if map.routes.contains_key(&key) {
                    return Err(AuthzError::DuplicateRoute {
                        resource: key.0,
                        method: key.1,
                    });
                }
                map.insert(&resource, &method, &entries);
            }
        }
        Ok(map)
    }

    /// Add or replace the requirements of one route.
    pub fn insert<S: AsRef<str>>(&mut self, resource: &str, method: &str, entries: &[S]) {
        let mut route = RouteRequirements::default();
        for entry in entries {
            match PermissionEntry::parse(entry.as_ref()) {
                Ok(parsed) => route.permissions.push(parsed),
                Err(_) => {
                    warn!(
                        resource,
                        method,
                        entry = entry.as_ref(),
                        "Malformed route permission; route will always be denied"
                    );
                    route.malformed.push(entry.as_ref().to_string());
                }
            }
        }
        self.routes.insert(Self::route_key(resource, method), route);
    }

    /// Requirements of a route, or `None` when the route is unmapped.
    pub fn required(&self, resource: &str, method: &str) -> Option<&RouteRequirements> {
        self.routes.get(&Self::route_key(resource, method))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn route_key(resource: &str, method: &str) -> (String, String) {
        (resource.trim().to_string(), method.trim().to_ascii_uppercase())
    }
}

/// Static `role → granted permissions` mapping, iterated in role-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMapping {
    roles: BTreeMap<String, Vec<String>>,
}

impl RoleMapping {
    pub fn from_path(path: &Path) -> Result<Self, AuthzError> {
        let mapping = Self::from_json_str(&read(path)?)?;
        info!(path = %path.display(), roles = mapping.roles.len(), "Loaded role mapping");
        Ok(mapping)
    }

    /// Entries are kept verbatim; malformed ones are reported but still
    /// stored so that evaluation can log and skip them.
    pub fn from_json_str(json: &str) -> Result<Self, AuthzError> {
        let roles: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        for (role, permissions) in &roles {
            for entry in permissions {
                if PermissionEntry::parse(entry).is_err() {
                    warn!(role = %role, entry = %entry, "Malformed permission in role mapping");
                }
            }
        }
        Ok(Self { roles })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for RoleMapping {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}
