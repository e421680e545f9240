//! String-backed enums stored in `users`, `merchants` and `transactions`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::auth::Role;
use tally_core::ledger;

/// `users.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "merchant")]
    Merchant,
    #[sea_orm(string_value = "user")]
    User,
}

impl From<UserRole> for Role {
    fn from(value: UserRole) -> Self {
        match value {
            UserRole::SuperAdmin => Self::SuperAdmin,
            UserRole::Merchant => Self::Merchant,
            UserRole::User => Self::NormalUser,
        }
    }
}

impl From<Role> for UserRole {
    fn from(value: Role) -> Self {
        match value {
            Role::SuperAdmin => Self::SuperAdmin,
            Role::Merchant => Self::Merchant,
            Role::NormalUser => Self::User,
        }
    }
}

/// `merchants.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum MerchantStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl From<MerchantStatus> for ledger::MerchantStatus {
    fn from(value: MerchantStatus) -> Self {
        match value {
            MerchantStatus::Active => Self::Active,
            MerchantStatus::Inactive => Self::Inactive,
        }
    }
}

impl From<ledger::MerchantStatus> for MerchantStatus {
    fn from(value: ledger::MerchantStatus) -> Self {
        match value {
            ledger::MerchantStatus::Active => Self::Active,
            ledger::MerchantStatus::Inactive => Self::Inactive,
        }
    }
}

/// `transactions.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum TransactionType {
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "debit")]
    Debit,
}

impl From<TransactionType> for ledger::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Credit => Self::Credit,
            TransactionType::Debit => Self::Debit,
        }
    }
}

impl From<ledger::TransactionType> for TransactionType {
    fn from(value: ledger::TransactionType) -> Self {
        match value {
            ledger::TransactionType::Credit => Self::Credit,
            ledger::TransactionType::Debit => Self::Debit,
        }
    }
}
