//! `SeaORM` active enums, stored as strings so every backend can hold them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::ledger::AccountType as LedgerAccountType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<LedgerAccountType> for AccountType {
    fn from(value: LedgerAccountType) -> Self {
        match value {
            LedgerAccountType::Asset => Self::Asset,
            LedgerAccountType::Liability => Self::Liability,
            LedgerAccountType::Equity => Self::Equity,
            LedgerAccountType::Revenue => Self::Revenue,
            LedgerAccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for LedgerAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}
