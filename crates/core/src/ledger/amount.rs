//! Transaction amount parsing.
//!
//! Amounts are stored as `NUMERIC(10,2)`: at most ten significant digits, two
//! of them after the decimal point.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::DomainError;

/// Total significant digits an amount may carry.
pub const MAX_DIGITS: u32 = 10;

/// Fractional digits an amount may carry.
pub const DECIMAL_PLACES: u32 = 2;

fn digit_count(value: Decimal) -> u32 {
    value
        .mantissa()
        .unsigned_abs()
        .checked_ilog10()
        .map_or(1, |log| log + 1)
}

/// Checks an already-parsed amount against the column's precision.
///
/// Trailing fractional zeros do not count, so `19.990` is accepted as `19.99`.
///
/// # Errors
///
/// Returns `DomainError::InvalidAmount` naming the first rule that fails.
pub fn validate_amount(value: Decimal) -> Result<Decimal, DomainError> {
    let value = value.normalize();
    let scale = value.scale();
    let digits = digit_count(value).max(scale);
    let whole_digits = digits - scale;

    if digits > MAX_DIGITS {
        return Err(DomainError::InvalidAmount(format!(
            "Ensure that there are no more than {MAX_DIGITS} digits in total."
        )));
    }
    if scale > DECIMAL_PLACES {
        return Err(DomainError::InvalidAmount(format!(
            "Ensure that there are no more than {DECIMAL_PLACES} decimal places."
        )));
    }
    if whole_digits > MAX_DIGITS - DECIMAL_PLACES {
        return Err(DomainError::InvalidAmount(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            MAX_DIGITS - DECIMAL_PLACES
        )));
    }
    Ok(value)
}

/// Parses form input into an amount.
///
/// # Errors
///
/// - `DomainError::Validation` when the input is blank
/// - `DomainError::InvalidAmount` when it is not a plain decimal number or
///   breaks the precision rules of [`validate_amount`]
pub fn parse_amount(raw: &str) -> Result<Decimal, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("amount", "This field is required."));
    }
    let value = Decimal::from_str(raw)
        .map_err(|_| DomainError::InvalidAmount("Enter a number.".to_string()))?;
    validate_amount(value)
}
