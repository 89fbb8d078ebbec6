//! SurrealDB implementation of [`UserRepository`].
//!
//! Emails are lower-cased on write and on lookup so the email index
//! behaves case-insensitively.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use workbench_core::error::{WorkbenchError, WorkbenchResult};
use workbench_core::models::user::{CreateUser, User};
use workbench_core::repository::UserRepository;

use crate::error::DbError;

/// DB-side row struct for queries where the ID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    display_name: String,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    email: String,
    display_name: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: String) -> User {
        User {
            id,
            email: self.email,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}

impl UserRowWithId {
    fn into_user(self) -> User {
        User {
            id: self.record_id,
            email: self.email,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// SurrealDB implementation of the user directory.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> WorkbenchResult<User> {
        if input.id.trim().is_empty() {
            return Err(WorkbenchError::Validation {
                message: "user id must not be empty".into(),
            });
        }

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, display_name = $display_name",
            )
            .bind(("id", input.id.clone()))
            .bind(("email", normalize_email(&input.email)))
            .bind(("display_name", input.display_name))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: input.id.clone(),
        })?;

        Ok(row.into_user(input.id))
    }

    async fn get_by_id(&self, id: &str) -> WorkbenchResult<User> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_user(id.to_string()))
    }

    async fn get_by_email(&self, email: &str) -> WorkbenchResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", normalize_email(email)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.into_user())
    }
}
