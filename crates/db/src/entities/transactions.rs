//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::ledger::LedgerTransaction;

use super::sea_orm_active_enums::TransactionType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub merchant_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_name = "type")]
    pub kind: TransactionType,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::merchants::Entity",
        from = "Column::MerchantId",
        to = "super::merchants::Column::Id",
        on_delete = "Cascade"
    )]
    Merchants,
}

impl Related<super::merchants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Merchants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LedgerTransaction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id.into(),
            merchant_id: model.merchant_id.into(),
            amount: model.amount,
            kind: model.kind.into(),
            description: model.description,
            created_at: model.created_at.to_utc(),
        }
    }
}
