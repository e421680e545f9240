//! Principal extractors and role guards.
//!
//! Handlers name the role they need in their signature:
//!
//! ```ignore
//! async fn handler(RequireSuperAdmin(admin): RequireSuperAdmin) -> Response {
//!     // only reached by super-admins
//! }
//! ```
//!
//! A failed guard redirects to the login page with "Access denied.".

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts, response::Response};
use tally_core::auth::{Principal, Role, policy};

use crate::response::Flash;
use crate::routes::LOGIN_PATH;

/// The signed-in principal, or `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Principal>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}

fn guard(parts: &Parts, role: Role) -> Result<Principal, Response> {
    let principal = parts.extensions.get::<Principal>();
    match policy::require(principal, role) {
        Ok(principal) => Ok(principal.clone()),
        Err(e) => {
            tracing::warn!(
                path = %parts.uri.path(),
                user_id = ?principal.map(|p| p.id),
                required = %role,
                "access denied"
            );
            Err(Flash::from_headers(&parts.headers)
                .error(e.to_string())
                .redirect(LOGIN_PATH))
        }
    }
}

/// A signed-in super-admin.
#[derive(Debug, Clone)]
pub struct RequireSuperAdmin(pub Principal);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, Role::SuperAdmin).map(Self)
    }
}

/// A signed-in merchant.
#[derive(Debug, Clone)]
pub struct RequireMerchant(pub Principal);

impl<S> FromRequestParts<S> for RequireMerchant
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, Role::Merchant).map(Self)
    }
}

/// A signed-in plain user.
#[derive(Debug, Clone)]
pub struct RequireNormalUser(pub Principal);

impl<S> FromRequestParts<S> for RequireNormalUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, Role::NormalUser).map(Self)
    }
}
