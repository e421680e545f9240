//! User repository: the identity store.
//!
//! Registration writes the principal and, for merchant registrants, the
//! merchant row in one database transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tally_core::DomainError;
use tally_core::auth::{self, Credential, Principal, Role};
use tally_core::ledger::{Merchant, MerchantStatus, RegistrationInput, default_business_name};
use tally_shared::types::{MerchantId, UserId};
use uuid::Uuid;

use crate::entities::{merchants, users};
use crate::error::StoreError;

/// Fields for creating a principal directly (seeding, merchant management).
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Plaintext password; hashed before it is stored.
    pub password: String,
    /// Role to assign.
    pub role: Role,
}

/// User repository for identity operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a principal by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<Principal>, DbErr> {
        Ok(users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(Principal::from))
    }

    /// Finds a principal by exact username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, DbErr> {
        Ok(find_model_by_username(&self.db, username)
            .await?
            .map(Principal::from))
    }

    /// Finds a principal by exact email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DbErr> {
        Ok(find_model_by_email(&self.db, email)
            .await?
            .map(Principal::from))
    }

    /// Registers a new principal from a validated registration form.
    ///
    /// Merchant registrants also get an active merchant named
    /// `"<First> <Last>'s Business"`.
    ///
    /// # Errors
    ///
    /// - `DuplicateUsername` / `DuplicateEmail` when either is taken
    /// - `Database` if any write fails; nothing is left behind in that case
    pub async fn register(
        &self,
        input: RegistrationInput,
    ) -> Result<(Principal, Option<Merchant>), StoreError> {
        ensure_identity_free(&self.db, &input.username, &input.email, None).await?;

        let role = if input.wants_merchant_role {
            Role::Merchant
        } else {
            Role::NormalUser
        };
        let password_hash = auth::hash_password(&input.password)?;

        let txn = self.db.begin().await?;

        let user = insert_user(
            &txn,
            NewUserRow {
                username: &input.username,
                email: &input.email,
                first_name: &input.first_name,
                last_name: &input.last_name,
                password_hash,
                role,
            },
        )
        .await?;

        let merchant = if role == Role::Merchant {
            let now = Utc::now().fixed_offset();
            let model = merchants::ActiveModel {
                id: Set(MerchantId::new().into_inner()),
                user_id: Set(user.id),
                business_name: Set(default_business_name(&user.first_name, &user.last_name)),
                business_address: Set(None),
                status: Set(MerchantStatus::Active.into()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            Some(Merchant::from(model))
        } else {
            None
        };

        txn.commit().await?;

        tracing::info!(user_id = %user.id, role = %role, "principal registered");
        Ok((user.into(), merchant))
    }

    /// Creates a principal outside of registration.
    ///
    /// # Errors
    ///
    /// - `DuplicateUsername` / `DuplicateEmail` when either is taken
    /// - `Password` if hashing fails
    pub async fn create(&self, new_user: NewUser) -> Result<Principal, StoreError> {
        ensure_identity_free(&self.db, &new_user.username, &new_user.email, None).await?;
        let password_hash = auth::hash_password(&new_user.password)?;

        let user = insert_user(
            &self.db,
            NewUserRow {
                username: &new_user.username,
                email: &new_user.email,
                first_name: &new_user.first_name,
                last_name: &new_user.last_name,
                password_hash,
                role: new_user.role,
            },
        )
        .await?;

        Ok(user.into())
    }

    /// Unified login: the identifier is tried as a username, then as an email.
    ///
    /// Stamps `last_login_at` on success.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` when nothing verifies
    /// - `AccountDisabled` when the verified principal is inactive
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Principal, StoreError> {
        let by_username = find_model_by_username(&self.db, identifier)
            .await?
            .map(Credential::from);

        let by_username_matches = by_username
            .as_ref()
            .is_some_and(|candidate| candidate.matches(password));

        let by_email = if by_username_matches {
            None
        } else {
            find_model_by_email(&self.db, identifier)
                .await?
                .map(Credential::from)
        };

        let principal = auth::resolve_login(password, by_username, by_email)?;

        users::ActiveModel {
            id: Set(principal.id.into_inner()),
            last_login_at: Set(Some(Utc::now().fixed_offset())),
            ..Default::default()
        }
        .update(&self.db)
        .await?;

        Ok(principal)
    }

    /// Replaces the principal's password after checking the current one.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the principal no longer exists
    /// - `PasswordMismatch` when new and confirmation differ
    /// - `InvalidCredentials` when the current password does not verify
    pub async fn change_password(
        &self,
        id: UserId,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), StoreError> {
        let user = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("User"))?;

        auth::check_password_change(
            &user.password_hash,
            current_password,
            new_password,
            confirm_password,
        )?;

        self.store_password(user, new_password).await
    }

    /// Replaces the principal's password unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the principal does not exist.
    pub async fn set_password(&self, id: UserId, new_password: &str) -> Result<(), StoreError> {
        let user = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("User"))?;

        self.store_password(user, new_password).await
    }

    async fn store_password(&self, user: users::Model, password: &str) -> Result<(), StoreError> {
        let password_hash = auth::hash_password(password)?;
        let mut active = user.into_active_model();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(&self.db).await?;
        Ok(())
    }

    /// Activates or deactivates a principal.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the principal does not exist.
    pub async fn set_active(&self, id: UserId, is_active: bool) -> Result<Principal, StoreError> {
        let user = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("User"))?;

        let mut active = user.into_active_model();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?.into())
    }
}

pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: String,
    pub role: Role,
}

/// Inserts a principal, mapping unique violations to duplicate errors.
pub(crate) async fn insert_user<C>(conn: &C, row: NewUserRow<'_>) -> Result<users::Model, StoreError>
where
    C: ConnectionTrait,
{
    let now = Utc::now().fixed_offset();
    users::ActiveModel {
        id: Set(UserId::new().into_inner()),
        username: Set(row.username.to_string()),
        email: Set(row.email.to_string()),
        first_name: Set(row.first_name.to_string()),
        last_name: Set(row.last_name.to_string()),
        password_hash: Set(row.password_hash),
        role: Set(row.role.into()),
        is_active: Set(true),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(StoreError::from_insert)
}

async fn find_model_by_username<C>(conn: &C, username: &str) -> Result<Option<users::Model>, DbErr>
where
    C: ConnectionTrait,
{
    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(conn)
        .await
}

async fn find_model_by_email<C>(conn: &C, email: &str) -> Result<Option<users::Model>, DbErr>
where
    C: ConnectionTrait,
{
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await
}

/// Rejects a username or email already used by a principal other than
/// `exclude`.
pub(crate) async fn ensure_identity_free<C>(
    conn: &C,
    username: &str,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    let others = |query: sea_orm::Select<users::Entity>| match exclude {
        Some(id) => query.filter(users::Column::Id.ne(id)),
        None => query,
    };

    let username_taken = others(users::Entity::find())
        .filter(users::Column::Username.eq(username))
        .count(conn)
        .await?
        > 0;
    if username_taken {
        return Err(DomainError::DuplicateUsername.into());
    }

    let email_taken = others(users::Entity::find())
        .filter(users::Column::Email.eq(email))
        .count(conn)
        .await?
        > 0;
    if email_taken {
        return Err(DomainError::DuplicateEmail.into());
    }

    Ok(())
}
