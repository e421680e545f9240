//! HTTP layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The route surface (login, registration, dashboards, merchant and
//!   transaction management, reports, settings)
//! - Session middleware and role-guard extractors
//! - The view / redirect / notice response contract

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use sea_orm::DatabaseConnection;
use tally_shared::JwtService;
use tower_http::sensitive_headers::{
    SetSensitiveRequestHeadersLayer, SetSensitiveResponseHeadersLayer,
};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::session_middleware;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Issues and validates session tokens.
    pub jwt_service: Arc<JwtService>,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookie: bool,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(SetSensitiveResponseHeadersLayer::new([SET_COOKIE]))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION, COOKIE]))
        .with_state(state)
}
