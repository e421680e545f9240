//! Unified login and password-change rules.

use super::Principal;
use super::password::verify_password;
use crate::error::DomainError;

/// A principal together with its stored password hash.
#[derive(Debug, Clone)]
pub struct Credential {
    /// The identity the hash belongs to.
    pub principal: Principal,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl Credential {
    /// Whether `password` verifies against the stored hash.
    ///
    /// An unparseable stored hash never matches.
    #[must_use]
    pub fn matches(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash).unwrap_or(false)
    }
}

/// Resolves a login attempt.
///
/// The identifier is tried as a username first (`by_username`), then as an
/// email address (`by_email`). The first candidate whose hash verifies wins.
///
/// # Errors
///
/// - `DomainError::InvalidCredentials` when no candidate verifies
/// - `DomainError::AccountDisabled` when the verified principal is inactive
pub fn resolve_login(
    password: &str,
    by_username: Option<Credential>,
    by_email: Option<Credential>,
) -> Result<Principal, DomainError> {
    let matched = [by_username, by_email]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.matches(password))
        .ok_or(DomainError::InvalidCredentials)?;

    if !matched.principal.is_active {
        return Err(DomainError::AccountDisabled);
    }
    Ok(matched.principal)
}

/// Checks a password change request against the stored hash.
///
/// # Errors
///
/// - `DomainError::PasswordMismatch` when `new_password != confirm_password`
/// - `DomainError::InvalidCredentials` when `current_password` does not verify
/// - `DomainError::Validation` when the new password is empty
pub fn check_password_change(
    current_hash: &str,
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), DomainError> {
    if new_password != confirm_password {
        return Err(DomainError::PasswordMismatch);
    }
    if new_password.is_empty() {
        return Err(DomainError::validation(
            "new_password",
            "This field is required.",
        ));
    }
    if !verify_password(current_password, current_hash).unwrap_or(false) {
        return Err(DomainError::InvalidCredentials);
    }
    Ok(())
}
