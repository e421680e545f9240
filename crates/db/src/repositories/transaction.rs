//! Transaction repository for ledger bookings.
//!
//! Transactions are append-only: they are created here and only ever removed
//! by the cascade when their merchant is deleted.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Select, Set,
};
use tally_core::DomainError;
use tally_core::ledger::{
    Filter, NewTransaction, TransactionType, TransactionWithMerchant, search_term,
    validate_amount,
};
use tally_shared::types::{MerchantId, PageRequest, PageResponse, TransactionId};
use uuid::Uuid;

use super::icontains;
use crate::entities::{self, merchants, transactions, users};
use crate::error::StoreError;

/// Transaction repository for ledger bookings.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists transactions newest first, one page at a time.
    ///
    /// `search` matches the merchant owner's username, the business name or
    /// the description, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        kind: Filter<TransactionType>,
        page: PageRequest,
    ) -> Result<PageResponse<TransactionWithMerchant>, DbErr> {
        let Some(query) = filtered(search, kind) else {
            return Ok(PageResponse::empty());
        };

        let total = query.clone().count(&self.db).await?;
        let page = page.clamp(total);

        let rows = newest_first(query)
            .select_also(merchants::Entity)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let data = attach_owners(&self.db, rows).await?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Newest transactions, optionally only one merchant's.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent(
        &self,
        merchant_id: Option<MerchantId>,
        limit: u64,
    ) -> Result<Vec<TransactionWithMerchant>, DbErr> {
        let mut query = transactions::Entity::find();
        if let Some(merchant_id) = merchant_id {
            query = query.filter(transactions::Column::MerchantId.eq(merchant_id.into_inner()));
        }

        let rows = newest_first(query)
            .find_also_related(merchants::Entity)
            .limit(limit)
            .all(&self.db)
            .await?;

        attach_owners(&self.db, rows).await
    }

    /// Records a booking against an existing merchant.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the merchant does not exist
    /// - `InvalidAmount` when the amount does not fit two decimal places and
    ///   ten digits
    pub async fn create(&self, input: NewTransaction) -> Result<TransactionWithMerchant, StoreError> {
        let amount = validate_amount(input.amount)?;

        let (merchant, owner) = merchants::Entity::find_by_id(input.merchant_id.into_inner())
            .find_also_related(users::Entity)
            .one(&self.db)
            .await?
            .and_then(|(merchant, owner)| owner.map(|owner| (merchant, owner)))
            .ok_or(DomainError::NotFound("Merchant"))?;

        let transaction = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            merchant_id: Set(merchant.id),
            amount: Set(amount),
            kind: Set(input.kind.into()),
            description: Set(input.description),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            transaction_id = %transaction.id,
            merchant_id = %merchant.id,
            kind = %input.kind,
            "transaction recorded"
        );

        Ok(TransactionWithMerchant {
            transaction: transaction.into(),
            merchant: merchant.into(),
            merchant_username: owner.username,
        })
    }
}

fn filtered(
    search: Option<&str>,
    kind: Filter<TransactionType>,
) -> Option<Select<transactions::Entity>> {
    let mut query = transactions::Entity::find()
        .join(JoinType::InnerJoin, transactions::Relation::Merchants.def())
        .join(JoinType::InnerJoin, merchants::Relation::Users.def());

    if let Some(term) = search_term(search) {
        query = query.filter(
            Condition::any()
                .add(icontains(users::Column::Username, term))
                .add(icontains(merchants::Column::BusinessName, term))
                .add(icontains(transactions::Column::Description, term)),
        );
    }

    match kind {
        Filter::Any => {}
        Filter::Only(kind) => {
            query = query.filter(transactions::Column::Kind.eq(entities::TransactionType::from(kind)));
        }
        Filter::Nothing => return None,
    }

    Some(query)
}

fn newest_first(query: Select<transactions::Entity>) -> Select<transactions::Entity> {
    query
        .order_by_desc(transactions::Column::CreatedAt)
        .order_by_desc(transactions::Column::Id)
}

/// Joins each row with its merchant owner's username in one extra query.
async fn attach_owners<C>(
    conn: &C,
    rows: Vec<(transactions::Model, Option<merchants::Model>)>,
) -> Result<Vec<TransactionWithMerchant>, DbErr>
where
    C: ConnectionTrait,
{
    let owner_ids: Vec<Uuid> = rows
        .iter()
        .filter_map(|(_, merchant)| merchant.as_ref().map(|m| m.user_id))
        .collect();

    let usernames: HashMap<Uuid, String> = if owner_ids.is_empty() {
        HashMap::new()
    } else {
        users::Entity::find()
            .filter(users::Column::Id.is_in(owner_ids))
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Username)
            .into_tuple::<(Uuid, String)>()
            .all(conn)
            .await?
            .into_iter()
            .collect()
    };

    Ok(rows
        .into_iter()
        .filter_map(|(transaction, merchant)| {
            let merchant = merchant?;
            let merchant_username = usernames.get(&merchant.user_id).cloned().unwrap_or_default();
            Some(TransactionWithMerchant {
                transaction: transaction.into(),
                merchant: merchant.into(),
                merchant_username,
            })
        })
        .collect())
}
