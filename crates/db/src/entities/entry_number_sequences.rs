//! `SeaORM` Entity for entry_number_sequences table.
//!
//! One row per numbering period. The journal writer bumps `last_value`
//! inside its own transaction, so numbers are never handed out twice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_number_sequences")]
pub struct Model {
    /// `YYYYMM`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub period: String,
    pub last_value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
