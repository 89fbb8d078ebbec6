//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Point lookups that miss return
//! [`WorkbenchError::NotFound`](crate::error::WorkbenchError::NotFound)
//! unless the signature says `Option`.

use crate::error::WorkbenchResult;
use crate::models::{
    access::{GrantAccess, ResourceAccess, ResourceKey, ResourceType},
    role::{Role, SyncRole},
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn get_by_name(&self, name: &str) -> impl Future<Output = WorkbenchResult<Role>> + Send;

    /// Upsert a role's permissions. `created_at` is only set when the
    /// role is first written; `updated_at` and `last_updated_by` are
    /// always refreshed. Members are left untouched.
    fn upsert_permissions(&self, input: SyncRole)
    -> impl Future<Output = WorkbenchResult<Role>> + Send;

    /// Add a user to a role's member set (no-op if already a member).
    fn add_user(
        &self,
        name: &str,
        user_id: &str,
    ) -> impl Future<Output = WorkbenchResult<Role>> + Send;

    /// Remove a user from a role's member set.
    fn remove_user(
        &self,
        name: &str,
        user_id: &str,
    ) -> impl Future<Output = WorkbenchResult<Role>> + Send;

    fn delete(&self, name: &str) -> impl Future<Output = WorkbenchResult<()>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WorkbenchResult<PaginatedResult<Role>>> + Send;
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = WorkbenchResult<User>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = WorkbenchResult<User>> + Send;
    /// Case-insensitive lookup through the email index.
    fn get_by_email(&self, email: &str) -> impl Future<Output = WorkbenchResult<User>> + Send;
}

// ---------------------------------------------------------------------------
// Resource access grants
// ---------------------------------------------------------------------------

pub trait ResourceAccessRepository: Send + Sync {
    /// Write a grant, atomically replacing any existing grant for the same
    /// `(user, resource)` pair.
    fn upsert(
        &self,
        input: GrantAccess,
    ) -> impl Future<Output = WorkbenchResult<ResourceAccess>> + Send;

    fn get(
        &self,
        user_id: &str,
        resource: &ResourceKey,
    ) -> impl Future<Output = WorkbenchResult<Option<ResourceAccess>>> + Send;

    /// All grants on one resource (access key index).
    fn list_by_resource(
        &self,
        resource: &ResourceKey,
    ) -> impl Future<Output = WorkbenchResult<Vec<ResourceAccess>>> + Send;

    /// All grants held by one user, optionally narrowed to a resource type.
    fn list_by_user(
        &self,
        user_id: &str,
        resource_type: Option<ResourceType>,
    ) -> impl Future<Output = WorkbenchResult<Vec<ResourceAccess>>> + Send;

    /// Returns `true` if a grant was removed.
    fn delete(
        &self,
        user_id: &str,
        resource: &ResourceKey,
    ) -> impl Future<Output = WorkbenchResult<bool>> + Send;

    /// Delete every grant whose access key equals `access_key` or starts
    /// with one of `prefixes`. Returns the number of removed grants.
    fn delete_by_access_key(
        &self,
        access_key: &str,
        prefixes: &[String],
    ) -> impl Future<Output = WorkbenchResult<u64>> + Send;
}
