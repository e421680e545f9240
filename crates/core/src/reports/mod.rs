//! Revenue reporting.
//!
//! The store computes per-merchant sums; ranking and windows live here so
//! they behave the same on every database backend.

pub mod types;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

pub use types::{
    AdminOverview, MerchantCounts, MerchantOverview, MerchantRevenue, ReportSummary,
    TransactionCounts, UserOverview,
};

use crate::ledger::Merchant;

/// Number of merchants on the reports page.
pub const TOP_MERCHANTS_LIMIT: usize = 10;

/// Number of rows in dashboard "recent" lists.
pub const RECENT_LIMIT: u64 = 5;

/// Length of the "monthly" revenue window in days.
pub const MONTHLY_WINDOW_DAYS: i64 = 30;

/// Start of the trailing revenue window ending at `now`.
#[must_use]
pub fn monthly_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(MONTHLY_WINDOW_DAYS)
}

/// Ranks merchants by credit total, highest first.
///
/// `merchants` must already be in default (newest first) order; merchants
/// missing from `revenue` rank with zero and ties keep their input order.
#[must_use]
pub fn rank_by_revenue<F>(merchants: Vec<Merchant>, revenue: F, limit: usize) -> Vec<MerchantRevenue>
where
    F: Fn(&Merchant) -> Option<Decimal>,
{
    let mut ranked: Vec<MerchantRevenue> = merchants
        .into_iter()
        .map(|merchant| MerchantRevenue {
            total_revenue: revenue(&merchant).unwrap_or(Decimal::ZERO),
            merchant,
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    ranked.truncate(limit);
    ranked
}
