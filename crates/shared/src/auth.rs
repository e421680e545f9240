//! Authentication types for session tokens and auth forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Role at the time the session was issued.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Unified login form.
///
/// `username` accepts either a username or an email address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default, skip_serializing)]
    pub password: String,
}

/// Self-service registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Password.
    #[serde(default, skip_serializing)]
    pub password1: String,
    /// Password confirmation.
    #[serde(default, skip_serializing)]
    pub password2: String,
    /// "Register as Merchant" checkbox; browsers omit unchecked boxes.
    #[serde(default)]
    pub is_staff: Option<String>,
}

impl RegisterRequest {
    /// Returns true when the merchant checkbox was ticked.
    #[must_use]
    pub fn wants_merchant_role(&self) -> bool {
        self.is_staff
            .as_deref()
            .is_some_and(|v| matches!(v, "on" | "true" | "1" | "yes"))
    }
}

/// Password change form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[serde(default)]
    pub current_password: String,
    /// New password.
    #[serde(default)]
    pub new_password: String,
    /// New password, repeated.
    #[serde(default)]
    pub confirm_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_fields() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);
        let before = Utc::now().timestamp();

        let claims = Claims::new(user_id, "merchant", expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.role, "merchant");
        assert!(claims.iat >= before);
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_merchant_checkbox() {
        let mut form = RegisterRequest::default();
        assert!(!form.wants_merchant_role());

        form.is_staff = Some("on".to_string());
        assert!(form.wants_merchant_role());

        form.is_staff = Some("off".to_string());
        assert!(!form.wants_merchant_role());
    }

    #[test]
    fn test_passwords_are_never_serialized() {
        let form = RegisterRequest {
            username: "amy".into(),
            password1: "hunter22".into(),
            password2: "hunter22".into(),
            ..RegisterRequest::default()
        };
        let json = serde_json::to_string(&form).unwrap();
        assert!(json.contains("amy"));
        assert!(!json.contains("hunter22"));
    }
}
