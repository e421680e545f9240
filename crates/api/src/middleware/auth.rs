//! Session middleware.
//!
//! Resolves the session token to a principal once per request and stores it
//! in the request extensions. The principal is reloaded from the store every
//! time, so role changes and deactivation apply immediately.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tally_core::auth::Principal;
use tally_db::UserRepository;
use tally_shared::types::UserId;

use crate::AppState;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "tally_session";

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// The session token from the cookie, or else from `Authorization: Bearer`.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_string)
}

/// Attaches the signed-in [`Principal`] to the request, if there is one.
///
/// Missing, expired or forged tokens and inactive principals all leave the
/// request anonymous; the role guards decide what that means.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(principal) = resolve_principal(&state, request.headers()).await {
        request.extensions_mut().insert(principal);
    }
    next.run(request).await
}

async fn resolve_principal(state: &AppState, headers: &HeaderMap) -> Option<Principal> {
    let token = session_token(headers)?;

    let claims = match state.jwt_service.validate_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session token");
            return None;
        }
    };

    let repo = UserRepository::new((*state.db).clone());
    match repo.find_by_id(UserId::from(claims.user_id())).await {
        Ok(Some(principal)) if principal.is_active => Some(principal),
        Ok(_) => None,
        Err(e) => {
            tracing::error!(error = %e, "failed to load session principal");
            None
        }
    }
}

/// Session cookie for a freshly issued token.
#[must_use]
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie used to expire the session.
#[must_use]
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_cookie_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer from-header".parse().unwrap());
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));

        headers.insert(
            axum::http::header::COOKIE,
            "tally_session=from-cookie".parse().unwrap(),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
