//! Merchant and transaction domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{MerchantId, TransactionId, UserId};

use crate::auth::Principal;

/// Merchant account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MerchantStatus {
    /// Merchant is trading.
    #[default]
    Active,
    /// Merchant has been switched off by a super-admin.
    Inactive,
}

impl MerchantStatus {
    /// The other status.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }

    /// Stored and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Past-tense verb used in the toggle notice.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Active => "activated",
            Self::Inactive => "deactivated",
        }
    }
}

impl std::fmt::Display for MerchantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MerchantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("unknown merchant status: {other}")),
        }
    }
}

/// Direction of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money in; counts towards revenue.
    Credit,
    /// Money out.
    Debit,
}

impl TransactionType {
    /// Stored and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// A merchant profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    /// Merchant ID.
    pub id: MerchantId,
    /// Owning principal.
    pub user_id: UserId,
    /// Trading name.
    pub business_name: String,
    /// Free-form postal address.
    pub business_address: Option<String>,
    /// Account status.
    pub status: MerchantStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

/// A merchant joined with its owning principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantWithOwner {
    /// The merchant.
    #[serde(flatten)]
    pub merchant: Merchant,
    /// Owner of the merchant.
    pub owner: Principal,
}

/// A recorded ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Merchant the amount is booked against.
    pub merchant_id: MerchantId,
    /// Positive magnitude by convention; sign is carried by `kind`.
    pub amount: Decimal,
    /// Credit or debit.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// May be empty.
    pub description: String,
    /// Booking time; never changes.
    pub created_at: DateTime<Utc>,
}

/// A transaction joined with its merchant and the merchant owner's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithMerchant {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: LedgerTransaction,
    /// The merchant it is booked against.
    pub merchant: Merchant,
    /// Username of the merchant's owner.
    pub merchant_username: String,
}

/// Default business name given to a merchant created at registration.
#[must_use]
pub fn default_business_name(first_name: &str, last_name: &str) -> String {
    format!("{}'s Business", crate::auth::full_name(first_name, last_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores() {
        for status in [MerchantStatus::Active, MerchantStatus::Inactive] {
            assert_ne!(status.toggled(), status);
            assert_eq!(status.toggled().toggled(), status);
        }
    }

    #[test]
    fn test_status_default_is_active() {
        assert_eq!(MerchantStatus::default(), MerchantStatus::Active);
    }

    #[test]
    fn test_parse() {
        assert_eq!("active".parse(), Ok(MerchantStatus::Active));
        assert_eq!("inactive".parse(), Ok(MerchantStatus::Inactive));
        assert!("Active".parse::<MerchantStatus>().is_err());
        assert_eq!("credit".parse(), Ok(TransactionType::Credit));
        assert_eq!("debit".parse(), Ok(TransactionType::Debit));
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_verbs() {
        assert_eq!(MerchantStatus::Active.verb(), "activated");
        assert_eq!(MerchantStatus::Inactive.verb(), "deactivated");
    }

    #[test]
    fn test_default_business_name() {
        assert_eq!(default_business_name("Ada", "Lovelace"), "Ada Lovelace's Business");
    }
}
