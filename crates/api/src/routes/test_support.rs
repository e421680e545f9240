//! Shared setup for route integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tally_core::auth::{Principal, Role};
use tally_core::ledger::{MerchantInput, MerchantStatus, MerchantWithOwner};
use tally_db::migration::{Migrator, MigratorTrait};
use tally_db::{MerchantRepository, NewUser, UserRepository};
use tally_shared::{JwtConfig, JwtService};
use tower::ServiceExt;

use crate::response::{FLASH_COOKIE, Notice, decode_notices};
use crate::{AppState, create_router};

/// Password of every principal created by [`TestApp`].
pub const PASSWORD: &str = "secret-pass";

/// The full router on a fresh in-memory database.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .expect("Failed to connect to database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let state = AppState {
            db: Arc::new(db),
            jwt_service: Arc::new(JwtService::new(JwtConfig {
                secret: "route-test-secret".to_string(),
                session_ttl_secs: 3600,
            })),
            secure_cookie: false,
        };
        let router = create_router(state.clone());
        Self { state, router }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new((*self.state.db).clone())
    }

    pub async fn create_user(&self, username: &str, role: Role) -> Principal {
        self.users()
            .create(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "Test".to_string(),
                last_name: "Person".to_string(),
                password: PASSWORD.to_string(),
                role,
            })
            .await
            .expect("Failed to create user")
    }

    pub async fn create_merchant(&self, username: &str, business_name: &str) -> MerchantWithOwner {
        MerchantRepository::new((*self.state.db).clone())
            .create(MerchantInput {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "Test".to_string(),
                last_name: "Merchant".to_string(),
                password: Some(PASSWORD.to_string()),
                business_name: business_name.to_string(),
                business_address: None,
                status: MerchantStatus::Active,
            })
            .await
            .expect("Failed to create merchant")
    }

    /// `Cookie` header value signing `principal` in.
    pub fn session_for(&self, principal: &Principal) -> String {
        let token = self
            .state
            .jwt_service
            .issue_session_token(principal.id.into_inner(), principal.role.as_str())
            .expect("Failed to issue token");
        format!("tally_session={token}")
    }

    /// A signed-in super-admin and their `Cookie` header.
    pub async fn admin_session(&self) -> (Principal, String) {
        let admin = self.create_user("admin", Role::SuperAdmin).await;
        let cookie = self.session_for(&admin);
        (admin, cookie)
    }
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("valid request")
}

pub fn get_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("valid request")
}

pub fn post_form(path: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("valid request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("JSON body")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Value of a cookie set by `response`, if any.
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Notices queued by a redirect response.
pub fn flashed(response: &Response<Body>) -> Vec<Notice> {
    set_cookie(response, FLASH_COOKIE)
        .map(|raw| decode_notices(&raw))
        .unwrap_or_default()
}

/// Message texts of the notices queued by a redirect response.
pub fn flashed_messages(response: &Response<Body>) -> Vec<String> {
    flashed(response).into_iter().map(|n| n.message).collect()
}
