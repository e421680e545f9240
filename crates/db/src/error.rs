//! Store error type.

use sea_orm::{DbErr, SqlErr};
use tally_core::DomainError;
use tally_core::auth::PasswordError;
use tally_shared::AppError;
use thiserror::Error;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// The domain error, if this is one.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::Password(_) | Self::Database(_) => None,
        }
    }

    /// Maps a unique-constraint violation on `users` to the matching
    /// duplicate error; anything else stays a database error.
    pub(crate) fn from_insert(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                if detail.contains("email") {
                    Self::Domain(DomainError::DuplicateEmail)
                } else {
                    Self::Domain(DomainError::DuplicateUsername)
                }
            }
            _ => Self::Database(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(domain) => domain.into(),
            StoreError::Password(e) => Self::Internal(e.to_string()),
            StoreError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
