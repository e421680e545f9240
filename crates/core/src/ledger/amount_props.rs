//! Property-based tests for amount precision rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::amount::{parse_amount, validate_amount};
use crate::error::DomainError;

/// Any amount that fits `NUMERIC(10,2)`.
fn storable_amount() -> impl Strategy<Value = Decimal> {
    (-9_999_999_999i64..=9_999_999_999i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every storable amount parses back from its own text.
    #[test]
    fn prop_storable_amounts_parse(amount in storable_amount()) {
        prop_assert_eq!(parse_amount(&amount.to_string()), Ok(amount.normalize()));
    }

    /// A third significant fractional digit is always rejected.
    #[test]
    fn prop_three_places_rejected(
        whole in 0i64..1_000_000,
        mills in (1i64..1000).prop_filter("last digit non-zero", |m| m % 10 != 0),
    ) {
        let value = Decimal::new(whole * 1000 + mills, 3);
        prop_assert!(matches!(validate_amount(value), Err(DomainError::InvalidAmount(_))));
    }

    /// Validation never changes the numeric value.
    #[test]
    fn prop_validation_preserves_value(amount in storable_amount()) {
        prop_assert_eq!(validate_amount(amount), Ok(amount.normalize()));
        prop_assert_eq!(validate_amount(amount).unwrap_or_default(), amount);
    }
}
