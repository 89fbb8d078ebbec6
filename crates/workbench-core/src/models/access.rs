//! Resource access (fine-grained) domain model.
//!
//! A grant ties one user to one resource instance at one [`AccessLevel`].
//! Resource instances are addressed by [`ResourceKey`], whose canonical
//! string form (`WORKSPACE#<id>`, `SOLUTION#<ws>#<id>`, `DATASOURCE#<id>`)
//! is the access key grants are indexed under.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WorkbenchError;

const KEY_SEPARATOR: char = '#';

/// Per-instance access level: `read_only=1 < editor=2 < owner=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    ReadOnly,
    Editor,
    Owner,
}

impl AccessLevel {
    pub fn rank(self) -> u8 {
        match self {
            AccessLevel::ReadOnly => 1,
            AccessLevel::Editor => 2,
            AccessLevel::Owner => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::ReadOnly => "read_only",
            AccessLevel::Editor => "editor",
            AccessLevel::Owner => "owner",
        }
    }

    /// Admission test: does `self` satisfy `required`?
    pub fn satisfies(self, required: AccessLevel) -> bool {
        required.rank() <= self.rank()
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read_only" => Ok(AccessLevel::ReadOnly),
            "editor" => Ok(AccessLevel::Editor),
            "owner" => Ok(AccessLevel::Owner),
            other => Err(WorkbenchError::Validation {
                message: format!("unknown access level: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Workspace,
    Solution,
    Datasource,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Workspace => "WORKSPACE",
            ResourceType::Solution => "SOLUTION",
            ResourceType::Datasource => "DATASOURCE",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WORKSPACE" => Ok(ResourceType::Workspace),
            "SOLUTION" => Ok(ResourceType::Solution),
            "DATASOURCE" => Ok(ResourceType::Datasource),
            other => Err(WorkbenchError::Validation {
                message: format!("unknown resource type: {other}"),
            }),
        }
    }
}

/// A resource instance that access can be granted on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKey {
    Workspace {
        workspace_id: String,
    },
    Solution {
        workspace_id: String,
        solution_id: String,
    },
    Datasource {
        datasource_id: String,
    },
}

impl ResourceKey {
    pub fn workspace(workspace_id: impl Into<String>) -> Self {
        ResourceKey::Workspace {
            workspace_id: workspace_id.into(),
        }
    }

    pub fn solution(workspace_id: impl Into<String>, solution_id: impl Into<String>) -> Self {
        ResourceKey::Solution {
            workspace_id: workspace_id.into(),
            solution_id: solution_id.into(),
        }
    }

    pub fn datasource(datasource_id: impl Into<String>) -> Self {
        ResourceKey::Datasource {
            datasource_id: datasource_id.into(),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceKey::Workspace { .. } => ResourceType::Workspace,
            ResourceKey::Solution { .. } => ResourceType::Solution,
            ResourceKey::Datasource { .. } => ResourceType::Datasource,
        }
    }

    /// Canonical access key string the grant is indexed under.
    pub fn access_key(&self) -> String {
        self.to_string()
    }

    /// Access key prefixes of dependent resources removed together with
    /// this one. A workspace owns its solutions.
    pub fn dependent_prefixes(&self) -> Vec<String> {
        match self {
            ResourceKey::Workspace { workspace_id } => vec![format!(
                "{}{KEY_SEPARATOR}{workspace_id}{KEY_SEPARATOR}",
                ResourceType::Solution
            )],
            ResourceKey::Solution { .. } | ResourceKey::Datasource { .. } => Vec::new(),
        }
    }

    fn validate_id(id: &str) -> Result<(), WorkbenchError> {
        if id.is_empty() || id.contains(KEY_SEPARATOR) {
            return Err(WorkbenchError::Validation {
                message: format!("invalid resource id: {id:?}"),
            });
        }
        Ok(())
    }

    /// Rejects empty ids and ids containing the key separator.
    pub fn validate(&self) -> Result<(), WorkbenchError> {
        match self {
            ResourceKey::Workspace { workspace_id } => Self::validate_id(workspace_id),
            ResourceKey::Solution {
                workspace_id,
                solution_id,
            } => {
                Self::validate_id(workspace_id)?;
                Self::validate_id(solution_id)
            }
            ResourceKey::Datasource { datasource_id } => Self::validate_id(datasource_id),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = KEY_SEPARATOR;
        match self {
            ResourceKey::Workspace { workspace_id } => {
                write!(f, "{}{sep}{workspace_id}", ResourceType::Workspace)
            }
            ResourceKey::Solution {
                workspace_id,
                solution_id,
            } => write!(
                f,
                "{}{sep}{workspace_id}{sep}{solution_id}",
                ResourceType::Solution
            ),
            ResourceKey::Datasource { datasource_id } => {
                write!(f, "{}{sep}{datasource_id}", ResourceType::Datasource)
            }
        }
    }
}

impl FromStr for ResourceKey {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(KEY_SEPARATOR).collect();
        let key = match parts.as_slice() {
            [ty, id] if *ty == ResourceType::Workspace.as_str() => ResourceKey::workspace(*id),
            [ty, id] if *ty == ResourceType::Datasource.as_str() => ResourceKey::datasource(*id),
            [ty, ws, id] if *ty == ResourceType::Solution.as_str() => {
                ResourceKey::solution(*ws, *id)
            }
            _ => {
                return Err(WorkbenchError::Validation {
                    message: format!("invalid access key: {s:?}"),
                });
            }
        };
        key.validate()?;
        Ok(key)
    }
}

/// A stored access grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAccess {
    pub user_id: String,
    pub resource: ResourceKey,
    pub access_level: AccessLevel,
    pub granted_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for granting (or replacing) a user's access to a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantAccess {
    pub user_id: String,
    pub resource: ResourceKey,
    pub access_level: AccessLevel,
    pub granted_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_keys_use_canonical_form() {
        assert_eq!(ResourceKey::workspace("w1").access_key(), "WORKSPACE#w1");
        assert_eq!(
            ResourceKey::solution("w1", "s1").access_key(),
            "SOLUTION#w1#s1"
        );
        assert_eq!(ResourceKey::datasource("d1").access_key(), "DATASOURCE#d1");
    }

    #[test]
    fn access_key_parses_back() {
        for key in [
            ResourceKey::workspace("w1"),
            ResourceKey::solution("w1", "s1"),
            ResourceKey::datasource("d1"),
        ] {
            assert_eq!(key.access_key().parse::<ResourceKey>().unwrap(), key);
        }
    }

    #[test]
    fn malformed_access_keys_are_rejected() {
        assert!("WORKSPACE".parse::<ResourceKey>().is_err());
        assert!("SOLUTION#w1".parse::<ResourceKey>().is_err());
        assert!("PROJECT#p1".parse::<ResourceKey>().is_err());
        assert!("WORKSPACE#".parse::<ResourceKey>().is_err());
    }

    #[test]
    fn workspace_owns_solution_prefix() {
        let prefixes = ResourceKey::workspace("w1").dependent_prefixes();
        assert_eq!(prefixes, vec!["SOLUTION#w1#".to_string()]);
        assert!(ResourceKey::solution("w1", "s1")
            .access_key()
            .starts_with(&prefixes[0]));
        assert!(ResourceKey::datasource("d1").dependent_prefixes().is_empty());
    }

    #[test]
    fn access_level_admission() {
        assert!(AccessLevel::Owner.satisfies(AccessLevel::Editor));
        assert!(AccessLevel::Editor.satisfies(AccessLevel::Editor));
        assert!(!AccessLevel::ReadOnly.satisfies(AccessLevel::Editor));
        assert_eq!("owner".parse::<AccessLevel>().unwrap(), AccessLevel::Owner);
        assert!("fullaccess".parse::<AccessLevel>().is_err());
    }
}
