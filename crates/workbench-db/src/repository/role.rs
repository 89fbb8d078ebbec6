//! SurrealDB implementation of [`RoleRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use workbench_core::error::WorkbenchResult;
use workbench_core::models::role::{Role, SyncRole};
use workbench_core::repository::{PaginatedResult, Pagination, RoleRepository};

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    name: String,
    permissions: Vec<String>,
    users: Vec<String>,
    last_updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self) -> Role {
        Role {
            name: self.name,
            permissions: self.permissions,
            users: self.users,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_updated_by: self.last_updated_by,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    fn first_row(rows: Vec<RoleRow>, name: &str) -> Result<Role, DbError> {
        rows.into_iter()
            .next()
            .map(RoleRow::into_role)
            .ok_or_else(|| DbError::NotFound {
                entity: "role".into(),
                id: name.to_string(),
            })
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn get_by_name(&self, name: &str) -> WorkbenchResult<Role> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $name)")
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(Self::first_row(rows, name)?)
    }

    async fn upsert_permissions(&self, input: SyncRole) -> WorkbenchResult<Role> {
        // created_at is only filled by its field DEFAULT, so an existing
        // role keeps its original creation time.
        let result = self
            .db
            .query(
                "UPSERT type::record('role', $name) SET \
                 name = $name, \
                 permissions = $permissions, \
                 last_updated_by = $updated_by, \
                 updated_at = time::now()",
            )
            .bind(("name", input.name.clone()))
            .bind(("permissions", input.permissions))
            .bind(("updated_by", input.updated_by))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(Self::first_row(rows, &input.name)?)
    }

    async fn add_user(&self, name: &str, user_id: &str) -> WorkbenchResult<Role> {
        let result = self
            .db
            .query(
                "UPDATE type::record('role', $name) SET \
                 users = array::union(users, [$user_id])",
            )
            .bind(("name", name.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(Self::first_row(rows, name)?)
    }

    async fn remove_user(&self, name: &str, user_id: &str) -> WorkbenchResult<Role> {
        let result = self
            .db
            .query("UPDATE type::record('role', $name) SET users -= $user_id")
            .bind(("name", name.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(Self::first_row(rows, name)?)
    }

    async fn delete(&self, name: &str) -> WorkbenchResult<()> {
        self.db
            .query("DELETE type::record('role', $name)")
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> WorkbenchResult<PaginatedResult<Role>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM role GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT * FROM role \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let items = rows.into_iter().map(RoleRow::into_role).collect();

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
