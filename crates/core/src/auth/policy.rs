//! Role predicates over an optional principal.
//!
//! `None` stands for an anonymous request and satisfies no predicate.

use super::{Principal, Role};
use crate::error::DomainError;

fn has_role(principal: Option<&Principal>, role: Role) -> bool {
    principal.is_some_and(|p| p.role == role)
}

/// Authenticated and a super-admin.
#[must_use]
pub fn is_superuser(principal: Option<&Principal>) -> bool {
    has_role(principal, Role::SuperAdmin)
}

/// Authenticated and a merchant.
#[must_use]
pub fn is_merchant(principal: Option<&Principal>) -> bool {
    has_role(principal, Role::Merchant)
}

/// Authenticated and a plain user.
#[must_use]
pub fn is_normal_user(principal: Option<&Principal>) -> bool {
    has_role(principal, Role::NormalUser)
}

/// Guards an operation on the principal's role.
///
/// # Errors
///
/// Returns `DomainError::AccessDenied` when the request is anonymous or the
/// principal holds a different role.
pub fn require(principal: Option<&Principal>, role: Role) -> Result<&Principal, DomainError> {
    match principal {
        Some(p) if p.role == role => Ok(p),
        _ => Err(DomainError::AccessDenied),
    }
}

/// Route path of the dashboard a role lands on after login.
#[must_use]
pub const fn dashboard_path(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "/super-admin/dashboard/",
        Role::Merchant => "/merchant/dashboard/",
        Role::NormalUser => "/user/dashboard/",
    }
}
