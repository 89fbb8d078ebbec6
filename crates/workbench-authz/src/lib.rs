//! Workbench Authz — endpoint-level RBAC, instance-level resource access
//! (FGAC), role synchronization and the combined access gate.
//!
//! Every service is generic over the `workbench-core` repository traits,
//! so this crate has no dependency on the database crate.

pub mod config;
pub mod decision;
pub mod error;
pub mod fgac;
pub mod gate;
pub mod rbac;
pub mod sync;

pub use config::{ApiPermissionMap, AuthzConfig, RoleMapping, RouteRequirements};
pub use decision::{AccessDecision, Denial, InsufficientPermission};
pub use error::AuthzError;
pub use fgac::{ResourceAccessService, ShareOutcome};
pub use gate::{AccessGate, AuthzRequest, TargetAccess};
pub use rbac::RbacEvaluator;
pub use sync::{reassign_user_role, sync_system_roles};
