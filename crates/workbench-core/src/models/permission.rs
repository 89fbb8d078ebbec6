//! Role permission model (`"<Key>.<level>"` entries).
//!
//! RBAC levels (`view`, `manage`, `fullaccess`) are a distinct vocabulary
//! from the resource access levels in [`super::access`]. Their ranks are
//! never compared with each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkbenchError;

/// Capability level granted by a role permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    View,
    Manage,
    #[serde(rename = "fullaccess")]
    FullAccess,
}

impl PermissionLevel {
    /// Ordinal strength: `view=1 < manage=2 < fullaccess=3`.
    pub fn rank(self) -> u8 {
        match self {
            PermissionLevel::View => 1,
            PermissionLevel::Manage => 2,
            PermissionLevel::FullAccess => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::View => "view",
            PermissionLevel::Manage => "manage",
            PermissionLevel::FullAccess => "fullaccess",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(PermissionLevel::View),
            "manage" => Ok(PermissionLevel::Manage),
            "fullaccess" => Ok(PermissionLevel::FullAccess),
            _ => Err(WorkbenchError::MalformedPermission {
                entry: s.to_string(),
            }),
        }
    }
}

/// A parsed `"<Key>.<level>"` permission.
///
/// The key is trimmed and lower-cased so that matching between granted
/// and required entries is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionEntry {
    pub key: String,
    pub level: PermissionLevel,
}

impl PermissionEntry {
    pub fn new(key: &str, level: PermissionLevel) -> Self {
        Self {
            key: key.trim().to_ascii_lowercase(),
            level,
        }
    }

    /// Parse a raw entry. The level is everything after the last `.`.
    pub fn parse(raw: &str) -> Result<Self, WorkbenchError> {
        let malformed = || WorkbenchError::MalformedPermission {
            entry: raw.to_string(),
        };
        let (key, level) = raw.trim().rsplit_once('.').ok_or_else(malformed)?;
        if key.trim().is_empty() {
            return Err(malformed());
        }
        let level = level.parse::<PermissionLevel>().map_err(|_| malformed())?;
        Ok(Self::new(key, level))
    }
}

impl fmt::Display for PermissionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.key, self.level)
    }
}

impl FromStr for PermissionEntry {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
