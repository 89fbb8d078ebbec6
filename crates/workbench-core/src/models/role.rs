//! Role domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named role with its granted permissions and current members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    /// Raw `"<Key>.<level>"` strings as stored; parsed at evaluation time.
    pub permissions: Vec<String>,
    /// IDs of users currently holding this role.
    pub users: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_updated_by: Option<String>,
}

impl Role {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u == user_id)
    }
}

/// Input for an idempotent permission upsert of one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRole {
    pub name: String,
    pub permissions: Vec<String>,
    pub updated_by: String,
}
