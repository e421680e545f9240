//! Super-admin profile settings.

use axum::{
    Form, Router,
    extract::State,
    response::Response,
    routing::get,
};
use serde_json::{Value, json};
use tally_core::DomainError;
use tally_core::form::{self, FormErrors, NON_FIELD_ERRORS};
use tally_db::{StoreError, UserRepository};
use tally_shared::auth::ChangePasswordRequest;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::RequireSuperAdmin;
use crate::response::{Flash, form_context};

const PROFILE_PATH: &str = "/super-admin/settings/profile/";
const PROFILE_VIEW: &str = "super_admin/settings_profile";

/// Creates the settings routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/super-admin/settings/profile/",
        get(profile_page).post(change_password),
    )
}

/// Passwords are never echoed back.
fn profile_context() -> Value {
    json!({ "form": form_context(json!({})) })
}

/// Maps a rejected change to the field the form shows it on.
fn change_error(error: DomainError) -> FormErrors {
    match error {
        DomainError::PasswordMismatch => FormErrors::from(DomainError::validation(
            NON_FIELD_ERRORS,
            "New passwords do not match.",
        )),
        DomainError::InvalidCredentials => FormErrors::from(DomainError::validation(
            "current_password",
            "Current password is incorrect.",
        )),
        other => FormErrors::from(other),
    }
}

/// GET `/super-admin/settings/profile/` - Password change form.
async fn profile_page(RequireSuperAdmin(_admin): RequireSuperAdmin, flash: Flash) -> Response {
    flash.render(PROFILE_VIEW, profile_context())
}

/// POST `/super-admin/settings/profile/` - Change the signed-in admin's password.
async fn change_password(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    flash: Flash,
    Form(payload): Form<ChangePasswordRequest>,
) -> ApiResult<Response> {
    let mut errors = FormErrors::new();
    errors.check(form::required("current_password", &payload.current_password));
    errors.check(form::required("new_password", &payload.new_password));
    errors.check(form::required("confirm_password", &payload.confirm_password));
    if !errors.is_empty() {
        return Ok(flash.render_invalid(PROFILE_VIEW, profile_context(), &errors));
    }

    match UserRepository::new((*state.db).clone())
        .change_password(
            admin.id,
            &payload.current_password,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await
    {
        Ok(()) => {
            info!(user_id = %admin.id, "password changed");
            Ok(flash
                .success("Password changed successfully!")
                .redirect(PROFILE_PATH))
        }
        Err(StoreError::Domain(e @ DomainError::NotFound(_))) => Err(e.into()),
        Err(StoreError::Domain(e)) => {
            info!(user_id = %admin.id, reason = %e, "password change rejected");
            Ok(flash.render_invalid(PROFILE_VIEW, profile_context(), &change_error(e)))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod integration_tests {
    use axum::http::StatusCode;
    use rstest::rstest;
    use tally_core::auth::Role;

    use super::super::test_support::{
        PASSWORD, TestApp, body_json, flashed_messages, get_with_cookie, location, post_form,
    };

    const PATH: &str = "/super-admin/settings/profile/";

    #[tokio::test]
    async fn test_profile_page() {
        let app = TestApp::new().await;
        let (_, cookie) = app.admin_session().await;

        let response = app.send(get_with_cookie(PATH, &cookie)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["view"], "super_admin/settings_profile");
        assert_eq!(body["context"]["form"]["errors"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_change_password() {
        let app = TestApp::new().await;
        let (_, cookie) = app.admin_session().await;

        let response = app
            .send(post_form(
                PATH,
                Some(&cookie),
                &format!("current_password={PASSWORD}&new_password=n3w-pass&confirm_password=n3w-pass"),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), PATH);
        assert_eq!(flashed_messages(&response), ["Password changed successfully!"]);
        assert!(app.users().login("admin", "n3w-pass").await.is_ok());
        assert!(app.users().login("admin", PASSWORD).await.is_err());
    }

    #[rstest]
    #[case::mismatch(PASSWORD, "one", "two", "__all__", "New passwords do not match.")]
    #[case::wrong_current("nope", "n3w", "n3w", "current_password", "Current password is incorrect.")]
    #[case::missing_confirmation(PASSWORD, "n3w", "", "confirm_password", "This field is required.")]
    #[tokio::test]
    async fn test_change_password_rejected(
        #[case] current: &str,
        #[case] new: &str,
        #[case] confirm: &str,
        #[case] field: &str,
        #[case] message: &str,
    ) {
        let app = TestApp::new().await;
        let (_, cookie) = app.admin_session().await;

        let response = app
            .send(post_form(
                PATH,
                Some(&cookie),
                &format!("current_password={current}&new_password={new}&confirm_password={confirm}"),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["context"]["form"]["errors"][field][0], message);
        assert!(app.users().login("admin", PASSWORD).await.is_ok());
    }

    #[tokio::test]
    async fn test_only_super_admin() {
        let app = TestApp::new().await;
        let merchant = app.create_user("shop", Role::Merchant).await;

        let response = app
            .send(get_with_cookie(PATH, &app.session_for(&merchant)))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login/");
    }
}
