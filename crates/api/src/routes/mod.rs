//! Route definitions.

use axum::{Router, response::Redirect, routing::get};
use serde_json::{Value, json};
use tally_core::auth::Principal;

use crate::AppState;

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod merchants;
pub mod reports;
pub mod settings;
pub mod transactions;

#[cfg(test)]
pub(crate) mod test_support;

/// Login page; every failed guard and logout lands here.
pub const LOGIN_PATH: &str = "/login/";

/// Paths of the old UI demo pages, all sent to the login page.
const LEGACY_PATHS: [&str; 7] = [
    "/dashboard/",
    "/cards/",
    "/forms/",
    "/tables/",
    "/ui/",
    "/pages/",
    "/layouts/",
];

/// Creates the router with every route.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(dashboard::routes())
        .merge(merchants::routes())
        .merge(transactions::routes())
        .merge(reports::routes())
        .merge(settings::routes())
        .merge(legacy_routes())
}

fn legacy_routes() -> Router<AppState> {
    LEGACY_PATHS.into_iter().fold(Router::new(), |router, path| {
        router.route(path, get(|| async { Redirect::to(LOGIN_PATH) }))
    })
}

/// The principal as exposed to views.
pub(crate) fn user_context(principal: &Principal) -> Value {
    json!({
        "id": principal.id,
        "username": principal.username,
        "email": principal.email,
        "first_name": principal.first_name,
        "last_name": principal.last_name,
        "full_name": principal.full_name(),
        "role": principal.role,
        "is_staff": principal.role.is_staff(),
        "is_superuser": principal.role.is_superuser(),
    })
}

#[cfg(test)]
mod integration_tests {
    use axum::http::{StatusCode, header::LOCATION};
    use rstest::rstest;

    use super::test_support::{TestApp, get};

    #[rstest]
    #[case("/dashboard/")]
    #[case("/cards/")]
    #[case("/forms/")]
    #[case("/tables/")]
    #[case("/ui/")]
    #[case("/pages/")]
    #[case("/layouts/")]
    #[tokio::test]
    async fn test_legacy_paths_redirect_to_login(#[case] path: &str) {
        let app = TestApp::new().await;

        let response = app.send(get(path)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login/");
    }
}
