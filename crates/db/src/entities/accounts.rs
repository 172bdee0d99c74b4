//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::ledger::{Account, AccountInfo};
use tally_shared::types::{AccountId, Money};

use super::sea_orm_active_enums::AccountType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub account_type: AccountType,
    pub parent_id: Option<Uuid>,
    /// Cents, natural direction.
    pub opening_balance: i64,
    /// Cents, natural direction; opening balance plus every posted line.
    pub current_balance: i64,
    pub is_active: bool,
    pub is_system_account: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entry_lines::Entity")]
    JournalEntryLines,
}

impl Related<super::journal_entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntryLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            id: AccountId::from_uuid(model.id),
            code: model.code,
            name: model.name,
            description: model.description,
            account_type: model.account_type.into(),
            parent_id: model.parent_id.map(AccountId::from_uuid),
            opening_balance: Money::from_minor_units(model.opening_balance).amount(),
            current_balance: Money::from_minor_units(model.current_balance).amount(),
            is_active: model.is_active,
            is_system_account: model.is_system_account,
            created_at: model.created_at,
        }
    }
}

impl From<&Model> for AccountInfo {
    fn from(model: &Model) -> Self {
        Self {
            id: AccountId::from_uuid(model.id),
            code: model.code.clone(),
            account_type: model.account_type.into(),
            is_active: model.is_active,
        }
    }
}
