//! Principals, roles, and credential handling.
//!
//! This module provides:
//! - The single-role principal model
//! - Role predicates used to guard every protected route
//! - Password hashing with Argon2id
//! - Unified (username or email) login resolution

mod login;
mod password;
pub mod policy;

#[cfg(test)]
mod policy_props;

pub use login::{Credential, check_password_change, resolve_login};
pub use password::{PasswordError, hash_password, verify_password};
pub use policy::{dashboard_path, is_merchant, is_normal_user, is_superuser, require};

use serde::{Deserialize, Serialize};
use tally_shared::types::UserId;

/// The one role a principal holds.
///
/// Replaces the legacy `is_staff`/`is_superuser` flag pair, so every principal
/// is in exactly one role by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages merchants, transactions, and reports.
    SuperAdmin,
    /// Owns a merchant profile and sees its revenue.
    Merchant,
    /// Sees personal transaction totals.
    #[serde(rename = "user")]
    NormalUser,
}

impl Role {
    /// Maps the legacy flag pair onto a role.
    ///
    /// The superuser flag wins, so `(is_staff = false, is_superuser = true)`
    /// is a super-admin.
    #[must_use]
    pub const fn from_flags(is_staff: bool, is_superuser: bool) -> Self {
        if is_superuser {
            Self::SuperAdmin
        } else if is_staff {
            Self::Merchant
        } else {
            Self::NormalUser
        }
    }

    /// Legacy `is_staff` flag.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Merchant)
    }

    /// Legacy `is_superuser` flag.
    #[must_use]
    pub const fn is_superuser(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Stable wire name, also stored in the `users.role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Merchant => "merchant",
            Self::NormalUser => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "merchant" => Ok(Self::Merchant),
            "user" => Ok(Self::NormalUser),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An authenticated (or authenticatable) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal ID.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The principal's role.
    pub role: Role,
    /// Inactive principals cannot log in.
    pub is_active: bool,
}

impl Principal {
    /// "First Last", trimmed; empty when both names are blank.
    #[must_use]
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// Joins given and family name the way greetings and defaults display them.
#[must_use]
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, false, Role::NormalUser)]
    #[case(true, false, Role::Merchant)]
    #[case(true, true, Role::SuperAdmin)]
    #[case(false, true, Role::SuperAdmin)]
    fn test_from_flags(#[case] is_staff: bool, #[case] is_superuser: bool, #[case] role: Role) {
        assert_eq!(Role::from_flags(is_staff, is_superuser), role);
    }

    #[test]
    fn test_flags_round_trip() {
        for role in [Role::SuperAdmin, Role::Merchant, Role::NormalUser] {
            assert_eq!(Role::from_flags(role.is_staff(), role.is_superuser()), role);
        }
    }

    #[test]
    fn test_role_wire_names() {
        for role in [Role::SuperAdmin, Role::Merchant, Role::NormalUser] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role.as_str())
            );
        }
        assert!("staff".parse::<Role>().is_err());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name("Ada", "Lovelace"), "Ada Lovelace");
        assert_eq!(full_name("Ada", ""), "Ada");
        assert_eq!(full_name("", ""), "");
    }
}
