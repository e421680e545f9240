//! Merchant repository.
//!
//! Every merchant has exactly one owning principal; creation writes both rows
//! in one database transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Select, Set, TransactionTrait,
};
use tally_core::DomainError;
use tally_core::auth::{self, Role};
use tally_core::ledger::{
    Filter, Merchant, MerchantInput, MerchantStatus, MerchantWithOwner, search_term,
};
use tally_shared::types::{MerchantId, PageRequest, PageResponse, UserId};

use super::icontains;
use super::user::{NewUserRow, ensure_identity_free, insert_user};
use crate::entities::{self, merchants, users};
use crate::error::StoreError;

/// Merchant repository for merchant management.
#[derive(Debug, Clone)]
pub struct MerchantRepository {
    db: DatabaseConnection,
}

impl MerchantRepository {
    /// Creates a new merchant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists merchants newest first, one page at a time.
    ///
    /// `search` matches owner username, first name, last name or business
    /// name, case-insensitively. An out-of-range page yields the last page.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Filter<MerchantStatus>,
        page: PageRequest,
    ) -> Result<PageResponse<MerchantWithOwner>, DbErr> {
        let Some(query) = filtered(search, status) else {
            return Ok(PageResponse::empty());
        };

        let total = query.clone().count(&self.db).await?;
        let page = page.clamp(total);

        let rows = newest_first(query)
            .select_also(users::Entity)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(with_owners(rows), page, total))
    }

    /// Newest merchants with their owners.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent(&self, limit: u64) -> Result<Vec<MerchantWithOwner>, DbErr> {
        let rows = newest_first(merchants::Entity::find())
            .find_also_related(users::Entity)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(with_owners(rows))
    }

    /// Every merchant, newest first; used for the booking form's choices.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn choices(&self) -> Result<Vec<MerchantWithOwner>, DbErr> {
        let rows = newest_first(merchants::Entity::find())
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;
        Ok(with_owners(rows))
    }

    /// Finds a merchant with its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: MerchantId) -> Result<Option<MerchantWithOwner>, DbErr> {
        let row = merchants::Entity::find_by_id(id.into_inner())
            .find_also_related(users::Entity)
            .one(&self.db)
            .await?;
        Ok(row.and_then(with_owner))
    }

    /// Finds the merchant owned by a principal.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_owner(&self, user_id: UserId) -> Result<Option<Merchant>, DbErr> {
        Ok(merchants::Entity::find()
            .filter(merchants::Column::UserId.eq(user_id.into_inner()))
            .one(&self.db)
            .await?
            .map(Merchant::from))
    }

    /// Creates a merchant together with its owning principal.
    ///
    /// The principal gets the merchant role. Both rows are written in one
    /// database transaction, so a failure leaves neither behind.
    ///
    /// # Errors
    ///
    /// - `DuplicateUsername` / `DuplicateEmail` when either is taken
    /// - `Validation` on `password` when none is supplied
    /// - `Database` if a write fails
    pub async fn create(&self, input: MerchantInput) -> Result<MerchantWithOwner, StoreError> {
        ensure_identity_free(&self.db, &input.username, &input.email, None).await?;

        let password = input
            .password
            .as_deref()
            .ok_or_else(|| DomainError::validation("password", "This field is required."))?;
        let password_hash = auth::hash_password(password)?;

        let txn = self.db.begin().await?;

        let owner = insert_user(
            &txn,
            NewUserRow {
                username: &input.username,
                email: &input.email,
                first_name: &input.first_name,
                last_name: &input.last_name,
                password_hash,
                role: Role::Merchant,
            },
        )
        .await?;

        let now = Utc::now().fixed_offset();
        let merchant = merchants::ActiveModel {
            id: Set(MerchantId::new().into_inner()),
            user_id: Set(owner.id),
            business_name: Set(input.business_name),
            business_address: Set(input.business_address),
            status: Set(input.status.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(merchant_id = %merchant.id, user_id = %owner.id, "merchant created");
        Ok(MerchantWithOwner {
            merchant: merchant.into(),
            owner: owner.into(),
        })
    }

    /// Updates a merchant and its owner.
    ///
    /// Username and email are checked against other principals only; the
    /// password changes only when a new one is supplied.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the merchant does not exist
    /// - `DuplicateUsername` / `DuplicateEmail` when another principal holds them
    pub async fn update(
        &self,
        id: MerchantId,
        input: MerchantInput,
    ) -> Result<MerchantWithOwner, StoreError> {
        let (merchant, owner) = merchants::Entity::find_by_id(id.into_inner())
            .find_also_related(users::Entity)
            .one(&self.db)
            .await?
            .and_then(|(merchant, owner)| owner.map(|owner| (merchant, owner)))
            .ok_or(DomainError::NotFound("Merchant"))?;

        ensure_identity_free(&self.db, &input.username, &input.email, Some(owner.id)).await?;

        let password_hash = input
            .password
            .as_deref()
            .map(auth::hash_password)
            .transpose()?;
        let now = Utc::now().fixed_offset();

        let txn = self.db.begin().await?;

        let mut owner = owner.into_active_model();
        owner.username = Set(input.username);
        owner.email = Set(input.email);
        owner.first_name = Set(input.first_name);
        owner.last_name = Set(input.last_name);
        if let Some(hash) = password_hash {
            owner.password_hash = Set(hash);
        }
        owner.updated_at = Set(now);
        let owner = owner.update(&txn).await.map_err(StoreError::from_insert)?;

        let mut merchant = merchant.into_active_model();
        merchant.business_name = Set(input.business_name);
        merchant.business_address = Set(input.business_address);
        merchant.status = Set(input.status.into());
        merchant.updated_at = Set(now);
        let merchant = merchant.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(merchant_id = %merchant.id, "merchant updated");
        Ok(MerchantWithOwner {
            merchant: merchant.into(),
            owner: owner.into(),
        })
    }

    /// Deletes a merchant and, by cascade, its transactions.
    ///
    /// The owning principal is kept.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the merchant does not exist.
    pub async fn delete(&self, id: MerchantId) -> Result<MerchantWithOwner, StoreError> {
        let merchant = self
            .find(id)
            .await?
            .ok_or(DomainError::NotFound("Merchant"))?;

        merchants::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;

        tracing::info!(merchant_id = %id, "merchant deleted");
        Ok(merchant)
    }

    /// Flips a merchant between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the merchant does not exist.
    pub async fn toggle_status(&self, id: MerchantId) -> Result<Merchant, StoreError> {
        let merchant = merchants::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Merchant"))?;

        let next = MerchantStatus::from(merchant.status).toggled();
        let mut active = merchant.into_active_model();
        active.status = Set(next.into());
        active.updated_at = Set(Utc::now().fixed_offset());
        let merchant = active.update(&self.db).await?;

        tracing::info!(merchant_id = %merchant.id, status = %next, "merchant status toggled");
        Ok(merchant.into())
    }

    /// Counts merchants, optionally only those with `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self, status: Option<MerchantStatus>) -> Result<u64, DbErr> {
        let mut query = merchants::Entity::find();
        if let Some(status) = status {
            query = query.filter(merchants::Column::Status.eq(entities::MerchantStatus::from(status)));
        }
        query.count(&self.db).await
    }
}

/// Merchants joined to their owners with the list filters applied.
///
/// `None` when the status filter can match nothing.
fn filtered(search: Option<&str>, status: Filter<MerchantStatus>) -> Option<Select<merchants::Entity>> {
    let mut query =
        merchants::Entity::find().join(JoinType::InnerJoin, merchants::Relation::Users.def());

    if let Some(term) = search_term(search) {
        query = query.filter(
            Condition::any()
                .add(icontains(users::Column::Username, term))
                .add(icontains(users::Column::FirstName, term))
                .add(icontains(users::Column::LastName, term))
                .add(icontains(merchants::Column::BusinessName, term)),
        );
    }

    match status {
        Filter::Any => {}
        Filter::Only(status) => {
            query = query.filter(merchants::Column::Status.eq(entities::MerchantStatus::from(status)));
        }
        Filter::Nothing => return None,
    }

    Some(query)
}

pub(crate) fn newest_first(query: Select<merchants::Entity>) -> Select<merchants::Entity> {
    query
        .order_by_desc(merchants::Column::CreatedAt)
        .order_by_desc(merchants::Column::Id)
}

pub(crate) fn with_owner(
    (merchant, owner): (merchants::Model, Option<users::Model>),
) -> Option<MerchantWithOwner> {
    owner.map(|owner| MerchantWithOwner {
        merchant: merchant.into(),
        owner: owner.into(),
    })
}

fn with_owners(rows: Vec<(merchants::Model, Option<users::Model>)>) -> Vec<MerchantWithOwner> {
    rows.into_iter().filter_map(with_owner).collect()
}
