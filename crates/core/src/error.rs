//! Domain error taxonomy.
//!
//! Every variant is recoverable by the user: handlers turn them into a notice
//! plus a redirect, or a re-rendered form with the error attached to a field.

use thiserror::Error;

use tally_shared::AppError;

/// Errors raised by access checks and ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The principal does not hold the role the operation requires.
    #[error("Access denied.")]
    AccessDenied,

    /// The referenced record does not exist.
    #[error("{0} not found.")]
    NotFound(&'static str),

    /// Another principal already uses this username.
    #[error("A user with this username already exists.")]
    DuplicateUsername,

    /// Another principal already uses this email address.
    #[error("A user with this email already exists.")]
    DuplicateEmail,

    /// Password and confirmation differ.
    #[error("The two password fields didn't match.")]
    PasswordMismatch,

    /// Identifier/password pair did not verify.
    #[error("Invalid username/email or password.")]
    InvalidCredentials,

    /// Credentials matched an inactive account.
    #[error("Your account has been disabled.")]
    AccountDisabled,

    /// Amount is not a decimal with at most two fractional digits.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A form field broke one of its rules.
    #[error("{message}")]
    Validation {
        /// Form field name.
        field: &'static str,
        /// Human readable message.
        message: String,
    },
}

impl DomainError {
    /// Shorthand for a field validation failure.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// The form field this error belongs to, if any.
    ///
    /// `None` means the error is shown as a form-wide (non-field) error.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateUsername => Some("username"),
            Self::DuplicateEmail => Some("email"),
            Self::InvalidAmount(_) => Some("amount"),
            Self::Validation { field, .. } => Some(field),
            Self::AccessDenied
            | Self::NotFound(_)
            | Self::PasswordMismatch
            | Self::InvalidCredentials
            | Self::AccountDisabled => None,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::AccessDenied => Self::Forbidden(message),
            DomainError::NotFound(_) => Self::NotFound(message),
            DomainError::DuplicateUsername | DomainError::DuplicateEmail => {
                Self::Conflict(message)
            }
            DomainError::InvalidCredentials | DomainError::AccountDisabled => {
                Self::Unauthorized(message)
            }
            DomainError::PasswordMismatch
            | DomainError::InvalidAmount(_)
            | DomainError::Validation { .. } => Self::Validation(message),
        }
    }
}
