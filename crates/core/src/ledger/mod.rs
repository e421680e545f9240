//! Merchant ledger domain.
//!
//! - Merchant and transaction types
//! - Amount precision rules
//! - Form inputs for registration, merchants and bookings
//! - List search and filter parameters

pub mod amount;
pub mod input;
pub mod search;
pub mod types;

#[cfg(test)]
mod amount_props;

pub use amount::{parse_amount, validate_amount};
pub use input::{
    FormMode, INVALID_CHOICE, MerchantInput, NewTransaction, RegistrationInput, TransactionInput,
    parse_status_choice,
};
pub use search::{Filter, contains_pattern, literal_pattern, search_term};
pub use types::{
    LedgerTransaction, Merchant, MerchantStatus, MerchantWithOwner, TransactionType,
    TransactionWithMerchant, default_business_name,
};
