//! Property-based tests for the access policy.

use proptest::prelude::*;
use tally_shared::types::UserId;

use super::policy::{is_merchant, is_normal_user, is_superuser, require};
use super::{Principal, Role};
use crate::error::DomainError;

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::SuperAdmin),
        Just(Role::Merchant),
        Just(Role::NormalUser)
    ]
}

fn principal_strategy() -> impl Strategy<Value = Principal> {
    (role_strategy(), any::<bool>(), "[a-z][a-z0-9_]{0,12}").prop_map(
        |(role, is_active, username)| Principal {
            id: UserId::new(),
            email: format!("{username}@example.com"),
            username,
            first_name: "First".into(),
            last_name: "Last".into(),
            role,
            is_active,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Exactly one predicate holds for any authenticated principal.
    #[test]
    fn prop_predicates_are_exclusive_and_exhaustive(p in principal_strategy()) {
        let held = [
            is_superuser(Some(&p)),
            is_merchant(Some(&p)),
            is_normal_user(Some(&p)),
        ]
        .into_iter()
        .filter(|held| *held)
        .count();
        prop_assert_eq!(held, 1);
    }

    /// `require` succeeds only for the principal's own role.
    #[test]
    fn prop_require_matches_role(p in principal_strategy(), wanted in role_strategy()) {
        let result = require(Some(&p), wanted);
        if wanted == p.role {
            prop_assert_eq!(result, Ok(&p));
        } else {
            prop_assert_eq!(result, Err(DomainError::AccessDenied));
        }
    }

    /// Legacy flags derived from a role map back to the same role.
    #[test]
    fn prop_legacy_flags_round_trip(role in role_strategy()) {
        prop_assert_eq!(Role::from_flags(role.is_staff(), role.is_superuser()), role);
    }
}
