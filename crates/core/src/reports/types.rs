//! Report and dashboard data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{Merchant, MerchantWithOwner, TransactionWithMerchant};

/// Merchant counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantCounts {
    /// All merchants.
    pub total: u64,
    /// Active merchants.
    pub active: u64,
    /// Inactive merchants.
    pub inactive: u64,
}

/// Transaction counts by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCounts {
    /// All transactions.
    pub total: u64,
    /// Credit transactions.
    pub credit: u64,
    /// Debit transactions.
    pub debit: u64,
}

/// A merchant with its credit total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantRevenue {
    /// The merchant.
    #[serde(flatten)]
    pub merchant: Merchant,
    /// Sum of its credit amounts; zero when it has none.
    pub total_revenue: Decimal,
}

/// The super-admin reports page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// All-time credit total.
    pub total_revenue: Decimal,
    /// Credit total over the trailing window.
    pub monthly_revenue: Decimal,
    /// Merchant counts.
    pub merchants: MerchantCounts,
    /// Transaction counts.
    pub transactions: TransactionCounts,
    /// Highest-earning merchants.
    pub top_merchants: Vec<MerchantRevenue>,
}

/// The super-admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOverview {
    /// All merchants.
    pub total_merchants: u64,
    /// Active merchants.
    pub active_merchants: u64,
    /// All transactions.
    pub total_transactions: u64,
    /// All-time credit total.
    pub total_revenue: Decimal,
    /// Newest merchants.
    pub recent_merchants: Vec<MerchantWithOwner>,
    /// Newest transactions.
    pub recent_transactions: Vec<TransactionWithMerchant>,
}

/// The merchant dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantOverview {
    /// The merchant's own profile.
    pub merchant: Merchant,
    /// Its transaction count.
    pub total_transactions: u64,
    /// Its credit total.
    pub total_revenue: Decimal,
    /// Its newest transactions.
    pub recent_transactions: Vec<TransactionWithMerchant>,
}

/// The plain user dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverview {
    /// Transactions of merchants the user owns.
    pub total_transactions: u64,
    /// Sum of their amounts regardless of type.
    pub total_amount: Decimal,
}
