//! Authorization decisions.
//!
//! A policy denial is a value, not an error: callers always get a
//! decision plus a human-readable reason. Only store failures surface as
//! `Err`.

use std::fmt;

use serde::Serialize;
use workbench_core::models::access::{AccessLevel, ResourceKey};
use workbench_core::models::permission::PermissionLevel;

/// A granted permission weaker than the route requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsufficientPermission {
    pub key: String,
    pub required: PermissionLevel,
    pub granted: PermissionLevel,
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Denial {
    RoleNotFound {
        role: String,
    },
    UserNotInRole {
        user_id: String,
        role: String,
    },
    NoMappingFound {
        resource: String,
        method: String,
    },
    MalformedRequirement {
        resource: String,
        method: String,
        entries: Vec<String>,
    },
    Permissions {
        missing: Vec<String>,
        insufficient: Vec<InsufficientPermission>,
    },
    ResourceAccess {
        resource: ResourceKey,
        required: AccessLevel,
        actual: Option<AccessLevel>,
    },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::RoleNotFound { role } => write!(f, "Role {role} not found"),
            Denial::UserNotInRole { user_id, role } => {
                write!(f, "User {user_id} is not assigned to role {role}")
            }
            Denial::NoMappingFound { resource, method } => {
                write!(f, "No API permissions found for {method} {resource}")
            }
            Denial::MalformedRequirement {
                resource,
                method,
                entries,
            } => write!(
                f,
                "Malformed API permissions for {method} {resource}: {}",
                entries.join(", ")
            ),
            Denial::Permissions {
                missing,
                insufficient,
            } => {
                let mut parts = Vec::new();
                if !missing.is_empty() {
                    parts.push(format!("Missing permissions: {}", missing.join(", ")));
                }
                if !insufficient.is_empty() {
                    let listed: Vec<String> = insufficient
                        .iter()
                        .map(|p| format!("{} (requires {}, has {})", p.key, p.required, p.granted))
                        .collect();
                    parts.push(format!("Insufficient permissions: {}", listed.join(", ")));
                }
                f.write_str(&parts.join("; "))
            }
            Denial::ResourceAccess {
                resource,
                required,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "Access level {actual} on {resource} does not satisfy required {required}"
                ),
                None => write!(f, "No access to {resource} (requires {required})"),
            },
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: String,
    pub denial: Option<Denial>,
}

impl AccessDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: "Action is allowed".into(),
            denial: None,
        }
    }

    pub fn deny(denial: Denial) -> Self {
        Self {
            allowed: false,
            reason: denial.to_string(),
            denial: Some(denial),
        }
    }
}
