//! Integration tests for the identity store.

mod common;

use sea_orm::EntityTrait;
use tally_core::DomainError;
use tally_core::auth::Role;
use tally_core::ledger::{MerchantStatus, RegistrationInput};
use tally_db::entities::users;
use tally_db::{NewUser, StoreError, UserRepository};

fn registration(username: &str, wants_merchant_role: bool) -> RegistrationInput {
    RegistrationInput {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        password: "analytical".to_string(),
        password_confirmation: "analytical".to_string(),
        wants_merchant_role,
    }
}

fn domain(err: StoreError) -> DomainError {
    match err {
        StoreError::Domain(err) => err,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_plain_user() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);

    let (principal, merchant) = repo
        .register(registration("ada", false))
        .await
        .expect("Failed to register");

    assert_eq!(principal.role, Role::NormalUser);
    assert!(principal.is_active);
    assert!(merchant.is_none());
}

#[tokio::test]
async fn test_register_merchant_creates_default_business() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);

    let (principal, merchant) = repo
        .register(registration("ada", true))
        .await
        .expect("Failed to register");

    assert_eq!(principal.role, Role::Merchant);
    let merchant = merchant.expect("Merchant should be created");
    assert_eq!(merchant.business_name, "Ada Lovelace's Business");
    assert_eq!(merchant.status, MerchantStatus::Active);
    assert_eq!(merchant.user_id, principal.id);
}

#[tokio::test]
async fn test_register_duplicates() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);
    repo.register(registration("ada", false))
        .await
        .expect("Failed to register");

    let err = repo
        .register(RegistrationInput {
            email: "other@example.com".to_string(),
            ..registration("ada", false)
        })
        .await
        .unwrap_err();
    assert_eq!(domain(err), DomainError::DuplicateUsername);

    let err = repo
        .register(RegistrationInput {
            email: "ada@example.com".to_string(),
            ..registration("grace", false)
        })
        .await
        .unwrap_err();
    assert_eq!(domain(err), DomainError::DuplicateEmail);
}

// ============================================================================
// Lookups
// ============================================================================

#[tokio::test]
async fn test_find_by_username_and_email() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);
    let (registered, _) = repo
        .register(registration("ada", false))
        .await
        .expect("Failed to register");

    let by_email = repo
        .find_by_email("ada@example.com")
        .await
        .expect("Failed to query by email")
        .expect("Email should match");
    assert_eq!(by_email.id, registered.id);
    assert_eq!(by_email.username, "ada");

    let by_username = repo
        .find_by_username("ada")
        .await
        .expect("Failed to query by username")
        .expect("Username should match");
    assert_eq!(by_username.id, registered.id);

    // Lookups are exact: no username/email crossover.
    assert!(repo.find_by_email("ada").await.expect("query").is_none());
    assert!(
        repo.find_by_username("ada@example.com")
            .await
            .expect("query")
            .is_none()
    );
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_by_username_and_email_resolve_same_principal() {
    let db = common::setup().await;
    let repo = UserRepository::new(db.clone());
    let (registered, _) = repo
        .register(registration("ada", false))
        .await
        .expect("Failed to register");

    let by_username = repo.login("ada", "analytical").await.expect("Login by username");
    let by_email = repo
        .login("ada@example.com", "analytical")
        .await
        .expect("Login by email");

    assert_eq!(by_username.id, registered.id);
    assert_eq!(by_email.id, registered.id);

    let row = users::Entity::find_by_id(registered.id.into_inner())
        .one(&db)
        .await
        .expect("Failed to query user")
        .expect("User should exist");
    assert!(row.last_login_at.is_some());
}

#[tokio::test]
async fn test_login_rejections() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);
    let (principal, _) = repo
        .register(registration("ada", false))
        .await
        .expect("Failed to register");

    let err = repo.login("ada", "wrong").await.unwrap_err();
    assert_eq!(domain(err), DomainError::InvalidCredentials);

    let err = repo.login("nobody", "analytical").await.unwrap_err();
    assert_eq!(domain(err), DomainError::InvalidCredentials);

    repo.set_active(principal.id, false)
        .await
        .expect("Failed to deactivate");
    let err = repo.login("ada@example.com", "analytical").await.unwrap_err();
    assert_eq!(domain(err), DomainError::AccountDisabled);
}

// ============================================================================
// Passwords
// ============================================================================

#[tokio::test]
async fn test_change_password() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);
    let (principal, _) = repo
        .register(registration("ada", false))
        .await
        .expect("Failed to register");

    let err = repo
        .change_password(principal.id, "analytical", "engine-1", "engine-2")
        .await
        .unwrap_err();
    assert_eq!(domain(err), DomainError::PasswordMismatch);

    let err = repo
        .change_password(principal.id, "wrong", "engine", "engine")
        .await
        .unwrap_err();
    assert_eq!(domain(err), DomainError::InvalidCredentials);

    repo.change_password(principal.id, "analytical", "engine", "engine")
        .await
        .expect("Failed to change password");

    assert!(repo.login("ada", "analytical").await.is_err());
    assert_eq!(
        repo.login("ada", "engine").await.expect("Login with new password").id,
        principal.id
    );
}

#[tokio::test]
async fn test_create_super_admin_and_reset_password() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);

    let admin = repo
        .create(NewUser {
            username: "admin".to_string(),
            email: "admin@gmail.com".to_string(),
            first_name: "Super".to_string(),
            last_name: "Admin".to_string(),
            password: "admin".to_string(),
            role: Role::SuperAdmin,
        })
        .await
        .expect("Failed to create admin");
    assert_eq!(admin.role, Role::SuperAdmin);
    assert_eq!(admin.full_name(), "Super Admin");

    repo.set_password(admin.id, "rotated")
        .await
        .expect("Failed to reset password");
    assert!(repo.login("admin", "rotated").await.is_ok());

    let found = repo
        .find_by_username("admin")
        .await
        .expect("Failed to query")
        .expect("Admin should exist");
    assert_eq!(found.id, admin.id);
}
