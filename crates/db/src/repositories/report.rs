//! Report repository: revenue sums, counts and dashboard overviews.
//!
//! Sums run in SQL. `SQLite` stores amounts as doubles, so every total is
//! rounded back to cents before it leaves the repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QuerySelect, RelationTrait, Select,
};
use tally_core::ledger::{Merchant, MerchantStatus, TransactionType};
use tally_core::reports::{
    self, AdminOverview, MerchantCounts, MerchantOverview, MerchantRevenue, RECENT_LIMIT,
    ReportSummary, TOP_MERCHANTS_LIMIT, TransactionCounts, UserOverview,
};
use tally_shared::types::{MerchantId, UserId};
use uuid::Uuid;

use super::merchant::{MerchantRepository, newest_first};
use super::transaction::TransactionRepository;
use crate::entities::{self, merchants, transactions};

/// Alias of the `SUM(amount)` column.
const TOTAL: &str = "total";

/// Rounds a summed amount to cents.
fn cents(total: Decimal) -> Decimal {
    total.round_dp(2)
}

/// Report repository for aggregate queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Sum of credit amounts, for one merchant or all of them; zero when there
    /// are none.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn aggregate_revenue(&self, merchant_id: Option<MerchantId>) -> Result<Decimal, DbErr> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(entities::TransactionType::Credit));
        if let Some(merchant_id) = merchant_id {
            query = query.filter(transactions::Column::MerchantId.eq(merchant_id.into_inner()));
        }

        self.sum_amounts(query).await
    }

    /// Sum of credit amounts booked at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revenue_since(&self, since: DateTime<Utc>) -> Result<Decimal, DbErr> {
        self.sum_amounts(
            transactions::Entity::find()
                .filter(transactions::Column::Kind.eq(entities::TransactionType::Credit))
                .filter(transactions::Column::CreatedAt.gte(since.fixed_offset())),
        )
        .await
    }

    /// `SUM(amount)` over `query`; zero when it selects no rows.
    async fn sum_amounts(&self, query: Select<transactions::Entity>) -> Result<Decimal, DbErr> {
        let total: Option<Option<Decimal>> = query
            .select_only()
            .column_as(transactions::Column::Amount.sum(), TOTAL)
            .into_tuple()
            .one(&self.db)
            .await?;

        Ok(cents(total.flatten().unwrap_or_default()))
    }

    /// Merchant counts by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn merchant_counts(&self) -> Result<MerchantCounts, DbErr> {
        let merchants = MerchantRepository::new(self.db.clone());
        Ok(MerchantCounts {
            total: merchants.count(None).await?,
            active: merchants.count(Some(MerchantStatus::Active)).await?,
            inactive: merchants.count(Some(MerchantStatus::Inactive)).await?,
        })
    }

    /// Transaction counts by type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn transaction_counts(&self) -> Result<TransactionCounts, DbErr> {
        let by_kind = |kind: TransactionType| {
            transactions::Entity::find()
                .filter(transactions::Column::Kind.eq(entities::TransactionType::from(kind)))
        };

        Ok(TransactionCounts {
            total: transactions::Entity::find().count(&self.db).await?,
            credit: by_kind(TransactionType::Credit).count(&self.db).await?,
            debit: by_kind(TransactionType::Debit).count(&self.db).await?,
        })
    }

    /// Merchants ranked by credit total, highest first.
    ///
    /// Merchants without credits rank with zero; ties keep newest-first order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn top_merchants_by_revenue(&self, limit: usize) -> Result<Vec<MerchantRevenue>, DbErr> {
        let revenue: HashMap<Uuid, Decimal> = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(entities::TransactionType::Credit))
            .select_only()
            .column(transactions::Column::MerchantId)
            .column_as(transactions::Column::Amount.sum(), TOTAL)
            .group_by(transactions::Column::MerchantId)
            .into_tuple::<(Uuid, Decimal)>()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(merchant_id, total)| (merchant_id, cents(total)))
            .collect();

        let merchants: Vec<Merchant> = newest_first(merchants::Entity::find())
            .all(&self.db)
            .await?
            .into_iter()
            .map(Merchant::from)
            .collect();

        Ok(reports::rank_by_revenue(
            merchants,
            |merchant| revenue.get(&merchant.id.into_inner()).copied(),
            limit,
        ))
    }

    /// Everything on the reports page.
    ///
    /// # Errors
    ///
    /// Returns an error if any database query fails.
    pub async fn summary(&self, now: DateTime<Utc>) -> Result<ReportSummary, DbErr> {
        Ok(ReportSummary {
            total_revenue: self.aggregate_revenue(None).await?,
            monthly_revenue: self.revenue_since(reports::monthly_window_start(now)).await?,
            merchants: self.merchant_counts().await?,
            transactions: self.transaction_counts().await?,
            top_merchants: self.top_merchants_by_revenue(TOP_MERCHANTS_LIMIT).await?,
        })
    }

    /// Everything on the super-admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if any database query fails.
    pub async fn admin_overview(&self) -> Result<AdminOverview, DbErr> {
        let merchants = MerchantRepository::new(self.db.clone());
        let transactions = TransactionRepository::new(self.db.clone());

        Ok(AdminOverview {
            total_merchants: merchants.count(None).await?,
            active_merchants: merchants.count(Some(MerchantStatus::Active)).await?,
            total_transactions: transactions::Entity::find().count(&self.db).await?,
            total_revenue: self.aggregate_revenue(None).await?,
            recent_merchants: merchants.recent(RECENT_LIMIT).await?,
            recent_transactions: transactions.recent(None, RECENT_LIMIT).await?,
        })
    }

    /// Everything on a merchant's dashboard; `None` when the principal owns
    /// no merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if any database query fails.
    pub async fn merchant_overview(&self, owner: UserId) -> Result<Option<MerchantOverview>, DbErr> {
        let Some(merchant) = MerchantRepository::new(self.db.clone())
            .find_by_owner(owner)
            .await?
        else {
            return Ok(None);
        };

        let total_transactions = transactions::Entity::find()
            .filter(transactions::Column::MerchantId.eq(merchant.id.into_inner()))
            .count(&self.db)
            .await?;

        Ok(Some(MerchantOverview {
            total_transactions,
            total_revenue: self.aggregate_revenue(Some(merchant.id)).await?,
            recent_transactions: TransactionRepository::new(self.db.clone())
                .recent(Some(merchant.id), RECENT_LIMIT)
                .await?,
            merchant,
        }))
    }

    /// Totals over transactions of merchants owned by `owner`, credits and
    /// debits alike.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn user_overview(&self, owner: UserId) -> Result<UserOverview, DbErr> {
        let owned = transactions::Entity::find()
            .join(JoinType::InnerJoin, transactions::Relation::Merchants.def())
            .filter(merchants::Column::UserId.eq(owner.into_inner()));

        Ok(UserOverview {
            total_transactions: owned.clone().count(&self.db).await?,
            total_amount: self.sum_amounts(owned).await?,
        })
    }
}
