//! Unified login, self-service registration, and logout.

use axum::{Form, Router, extract::State, response::Response, routing::get};
use serde_json::{Value, json};
use tally_core::auth::{Principal, Role, dashboard_path};
use tally_core::form::{self, FormErrors};
use tally_core::ledger::RegistrationInput;
use tally_db::{StoreError, UserRepository};
use tally_shared::AppError;
use tally_shared::auth::{LoginRequest, RegisterRequest};
use tracing::info;

use super::LOGIN_PATH;
use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::CurrentUser;
use crate::middleware::{expired_session_cookie, session_cookie};
use crate::response::{Flash, form_context};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page).post(login))
        .route("/login/", get(login_page).post(login))
        .route("/register/", get(register_page).post(register))
        .route("/logout/", get(logout).post(logout))
}

fn login_context(username: &str) -> Value {
    json!({ "form": form_context(json!({ "username": username })) })
}

fn welcome_message(principal: &Principal) -> String {
    match principal.role {
        Role::SuperAdmin => format!("Welcome back, Super Admin {}!", principal.username),
        Role::Merchant => format!("Welcome back, Merchant {}!", principal.full_name()),
        Role::NormalUser => format!("Welcome back, {}!", principal.full_name()),
    }
}

/// GET `/login/` - Login form; signed-in principals go to their dashboard.
async fn login_page(CurrentUser(current): CurrentUser, flash: Flash) -> Response {
    if let Some(principal) = current {
        return flash.redirect(dashboard_path(principal.role));
    }
    flash.render("auth/login", login_context(""))
}

/// POST `/login/` - Authenticate by username or email.
async fn login(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    flash: Flash,
    Form(payload): Form<LoginRequest>,
) -> ApiResult<Response> {
    if let Some(principal) = current {
        return Ok(flash.redirect(dashboard_path(principal.role)));
    }

    let identifier = payload.username.trim();
    let context = login_context(identifier);

    let mut errors = FormErrors::new();
    errors.check(form::required("username", identifier));
    errors.check(form::required("password", &payload.password));
    if !errors.is_empty() {
        return Ok(flash.render_invalid("auth/login", context, &errors));
    }

    let repo = UserRepository::new((*state.db).clone());
    let principal = match repo.login(identifier, &payload.password).await {
        Ok(principal) => principal,
        Err(StoreError::Domain(e)) => {
            info!(identifier = %identifier, reason = %e, "login rejected");
            return Ok(flash.render_invalid("auth/login", context, &FormErrors::from(e)));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state
        .jwt_service
        .issue_session_token(principal.id.into_inner(), principal.role.as_str())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(user_id = %principal.id, role = %principal.role, "user logged in");

    Ok(flash
        .add_cookie(session_cookie(token, state.secure_cookie))
        .success(welcome_message(&principal))
        .redirect(dashboard_path(principal.role)))
}

fn registration_context(payload: &RegisterRequest) -> Value {
    json!({
        "form": form_context(json!({
            "username": payload.username,
            "email": payload.email,
            "first_name": payload.first_name,
            "last_name": payload.last_name,
            "is_staff": payload.wants_merchant_role(),
        }))
    })
}

/// GET `/register/` - Registration form.
async fn register_page(CurrentUser(current): CurrentUser, flash: Flash) -> Response {
    if current.is_some() {
        return flash.redirect(LOGIN_PATH);
    }
    flash.render(
        "auth/register",
        registration_context(&RegisterRequest::default()),
    )
}

/// POST `/register/` - Create a plain or merchant account.
async fn register(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    flash: Flash,
    Form(payload): Form<RegisterRequest>,
) -> ApiResult<Response> {
    if current.is_some() {
        return Ok(flash.redirect(LOGIN_PATH));
    }

    let context = registration_context(&payload);
    let wants_merchant_role = payload.wants_merchant_role();
    let input = RegistrationInput {
        username: payload.username,
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        password: payload.password1,
        password_confirmation: payload.password2,
        wants_merchant_role,
    };

    let input = match input.validate() {
        Ok(input) => input,
        Err(errors) => return Ok(flash.render_invalid("auth/register", context, &errors)),
    };

    match UserRepository::new((*state.db).clone()).register(input).await {
        Ok((principal, merchant)) => {
            info!(
                user_id = %principal.id,
                role = %principal.role,
                merchant_id = ?merchant.map(|m| m.id),
                "account registered"
            );
            Ok(flash
                .success("Account created successfully! Please login.")
                .redirect(LOGIN_PATH))
        }
        Err(StoreError::Domain(e)) => {
            Ok(flash.render_invalid("auth/register", context, &FormErrors::from(e)))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET/POST `/logout/` - End the session.
async fn logout(CurrentUser(current): CurrentUser, flash: Flash) -> Response {
    if let Some(principal) = current {
        info!(user_id = %principal.id, "user logged out");
    }
    flash
        .remove_cookie(expired_session_cookie())
        .success("You have been logged out successfully.")
        .redirect(LOGIN_PATH)
}
