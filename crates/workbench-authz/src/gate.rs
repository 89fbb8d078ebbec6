//! Combined access gate: RBAC on the route, then FGAC on the target.

use serde::{Deserialize, Serialize};
use tracing::debug;
use workbench_core::error::WorkbenchResult;
use workbench_core::models::access::{AccessLevel, ResourceKey};
use workbench_core::repository::{ResourceAccessRepository, RoleRepository, UserRepository};

use crate::decision::{AccessDecision, Denial};
use crate::fgac::ResourceAccessService;
use crate::rbac::RbacEvaluator;

/// Instance-level requirement of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAccess {
    pub resource: ResourceKey,
    pub required: AccessLevel,
}

/// A request carrying an identity already verified upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzRequest {
    pub user_id: String,
    pub role: String,
    pub resource: String,
    pub method: String,
    pub target: Option<TargetAccess>,
}

pub struct AccessGate<R, A, U>
where
    R: RoleRepository,
    A: ResourceAccessRepository,
    U: UserRepository,
{
    rbac: RbacEvaluator<R>,
    fgac: ResourceAccessService<A, U, R>,
}

impl<R, A, U> AccessGate<R, A, U>
where
    R: RoleRepository,
    A: ResourceAccessRepository,
    U: UserRepository,
{
    pub fn new(rbac: RbacEvaluator<R>, fgac: ResourceAccessService<A, U, R>) -> Self {
        Self { rbac, fgac }
    }

    pub fn rbac(&self) -> &RbacEvaluator<R> {
        &self.rbac
    }

    pub fn fgac(&self) -> &ResourceAccessService<A, U, R> {
        &self.fgac
    }

    /// Coarse gate first; the fine gate only runs when the route is
    /// allowed and the request names a target resource.
    pub async fn authorize(&self, request: &AuthzRequest) -> WorkbenchResult<AccessDecision> {
        let decision = self
            .rbac
            .is_action_valid(
                &request.user_id,
                &request.role,
                &request.resource,
                &request.method,
            )
            .await?;
        if !decision.allowed {
            return Ok(decision);
        }

        let Some(target) = &request.target else {
            return Ok(decision);
        };

        let actual = self
            .fgac
            .check_access(&request.user_id, &target.resource)
            .await?;
        if actual.is_some_and(|level| level.satisfies(target.required)) {
            return Ok(decision);
        }

        debug!(
            user_id = %request.user_id,
            resource = %target.resource,
            required = %target.required,
            "Resource access denied"
        );
        Ok(AccessDecision::deny(Denial::ResourceAccess {
            resource: target.resource.clone(),
            required: target.required,
            actual,
        }))
    }
}
