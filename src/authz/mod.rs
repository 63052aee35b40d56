//! Authorization module - department-scoped RBAC
//!
//! This module implements the policy engine with support for:
//! - A closed role set (member, admin, sysadmin) that fails closed on anything else
//! - A department-head flag scoped to the actor's own department
//! - Sysadmin bypass of department scoping
//! - Pure predicates, evaluated before any repository call

mod actor;
mod evaluator;
pub mod policy;

pub use actor::{Actor, Role};
pub use evaluator::{DefaultPolicyEvaluator, Permission, PolicyEvaluator, ResourceContext};

use crate::errors::AppError;

/// Reads require an approved account; sysadmins are exempt because the
/// bootstrap administrator has no department.
pub fn require_approved(actor: &Actor) -> Result<(), AppError> {
    if actor.is_sysadmin() || actor.approved {
        return Ok(());
    }

    Err(AppError::forbidden(
        "your account is pending approval; a system administrator must assign your department and role",
    ))
}
