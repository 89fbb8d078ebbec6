//! SurrealDB implementation of [`ResourceAccessRepository`].
//!
//! A grant's record ID is `[user_id, access_key]`, so granting is a single
//! `UPSERT` that replaces any previous level for the same pair.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use workbench_core::error::WorkbenchResult;
use workbench_core::models::access::{
    AccessLevel, GrantAccess, ResourceAccess, ResourceKey, ResourceType,
};
use workbench_core::repository::ResourceAccessRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ResourceAccessRow {
    user_id: String,
    access_key: String,
    access_level: String,
    granted_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl ResourceAccessRow {
    fn try_into_access(self) -> Result<ResourceAccess, DbError> {
        let resource = self
            .access_key
            .parse::<ResourceKey>()
            .map_err(|e| DbError::Decode(e.to_string()))?;
        let access_level = self
            .access_level
            .parse::<AccessLevel>()
            .map_err(|e| DbError::Decode(e.to_string()))?;
        Ok(ResourceAccess {
            user_id: self.user_id,
            resource,
            access_level,
            granted_by: self.granted_by,
            created_at: self.created_at,
        })
    }
}

fn into_accesses(rows: Vec<ResourceAccessRow>) -> Result<Vec<ResourceAccess>, DbError> {
    rows.into_iter()
        .map(ResourceAccessRow::try_into_access)
        .collect()
}

/// SurrealDB implementation of the resource access repository.
#[derive(Clone)]
pub struct SurrealResourceAccessRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealResourceAccessRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResourceAccessRepository for SurrealResourceAccessRepository<C> {
    async fn upsert(&self, input: GrantAccess) -> WorkbenchResult<ResourceAccess> {
        input.resource.validate()?;
        let access_key = input.resource.access_key();

        let result = self
            .db
            .query(
                "UPSERT type::record('resource_access', [$user_id, $access_key]) SET \
                 user_id = $user_id, \
                 access_key = $access_key, \
                 resource_type = $resource_type, \
                 access_level = $access_level, \
                 granted_by = $granted_by, \
                 created_at = time::now()",
            )
            .bind(("user_id", input.user_id.clone()))
            .bind(("access_key", access_key.clone()))
            .bind(("resource_type", input.resource.resource_type().as_str().to_string()))
            .bind(("access_level", input.access_level.as_str().to_string()))
            .bind(("granted_by", input.granted_by))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ResourceAccessRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "resource_access".into(),
            id: format!("{}/{access_key}", input.user_id),
        })?;

        Ok(row.try_into_access()?)
    }

    async fn get(
        &self,
        user_id: &str,
        resource: &ResourceKey,
    ) -> WorkbenchResult<Option<ResourceAccess>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('resource_access', [$user_id, $access_key])")
            .bind(("user_id", user_id.to_string()))
            .bind(("access_key", resource.access_key()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceAccessRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_access()?)),
            None => Ok(None),
        }
    }

    async fn list_by_resource(
        &self,
        resource: &ResourceKey,
    ) -> WorkbenchResult<Vec<ResourceAccess>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM resource_access \
                 WHERE access_key = $access_key \
                 ORDER BY user_id ASC",
            )
            .bind(("access_key", resource.access_key()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceAccessRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_accesses(rows)?)
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        resource_type: Option<ResourceType>,
    ) -> WorkbenchResult<Vec<ResourceAccess>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM resource_access \
                 WHERE user_id = $user_id \
                 AND ($resource_type = NONE OR resource_type = $resource_type) \
                 ORDER BY access_key ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("resource_type", resource_type.map(|t| t.as_str().to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceAccessRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_accesses(rows)?)
    }

    async fn delete(&self, user_id: &str, resource: &ResourceKey) -> WorkbenchResult<bool> {
        let mut result = self
            .db
            .query(
                "DELETE type::record('resource_access', [$user_id, $access_key]) \
                 RETURN BEFORE",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("access_key", resource.access_key()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceAccessRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn delete_by_access_key(
        &self,
        access_key: &str,
        prefixes: &[String],
    ) -> WorkbenchResult<u64> {
        let mut result = self
            .db
            .query("DELETE resource_access WHERE access_key = $access_key RETURN BEFORE")
            .bind(("access_key", access_key.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<ResourceAccessRow> = result.take(0).map_err(DbError::from)?;
        let mut deleted = rows.len() as u64;

        for prefix in prefixes {
            let mut result = self
                .db
                .query(
                    "DELETE resource_access \
                     WHERE string::starts_with(access_key, $prefix) \
                     RETURN BEFORE",
                )
                .bind(("prefix", prefix.clone()))
                .await
                .map_err(DbError::from)?;
            let rows: Vec<ResourceAccessRow> = result.take(0).map_err(DbError::from)?;
            deleted += rows.len() as u64;
        }

        debug!(access_key, deleted, "Deleted resource access grants");
        Ok(deleted)
    }
}
