//! Sum of debit and credit lines per account within a date window.
//!
//! This is the single aggregate query behind every balance and report.
//! Only posted entries count.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QuerySelect, RelationTrait,
};
use tally_core::ledger::Movement;
use tally_shared::types::AccountId;
use uuid::Uuid;

use super::from_cents;
use crate::entities::{journal_entries, journal_entry_lines};

/// Inclusive window on entry dates; `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    /// First entry date included.
    pub start: Option<NaiveDate>,
    /// Last entry date included.
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// All history.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Everything dated on or before `end`.
    #[must_use]
    pub const fn up_to(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Everything dated between `start` and `end`, inclusive.
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// `up_to(end)` when a date is given, otherwise all history.
    #[must_use]
    pub const fn as_of(end: Option<NaiveDate>) -> Self {
        Self { start: None, end }
    }
}

#[derive(Debug, FromQueryResult)]
struct MovementRow {
    account_id: Uuid,
    total_debits: Option<i64>,
    total_credits: Option<i64>,
}

/// Sums posted lines per account inside `window`.
///
/// Restricts to `account_ids` when given. Accounts without lines in the
/// window are absent from the result.
pub async fn account_movements<C>(
    db: &C,
    window: DateWindow,
    account_ids: Option<&[AccountId]>,
) -> Result<HashMap<AccountId, Movement>, DbErr>
where
    C: ConnectionTrait,
{
    // an overflowing sum raises a storage error on both backends
    let sum_cents = |column: journal_entry_lines::Column| {
        SimpleExpr::from(Func::cast_as(
            Func::sum(Expr::col((journal_entry_lines::Entity, column))),
            Alias::new("BIGINT"),
        ))
    };

    let mut query = journal_entry_lines::Entity::find()
        .select_only()
        .column(journal_entry_lines::Column::AccountId)
        .column_as(sum_cents(journal_entry_lines::Column::Debit), "total_debits")
        .column_as(sum_cents(journal_entry_lines::Column::Credit), "total_credits")
        .join(
            JoinType::InnerJoin,
            journal_entry_lines::Relation::JournalEntries.def(),
        )
        .filter(journal_entries::Column::IsPosted.eq(true));

    if let Some(start) = window.start {
        query = query.filter(journal_entries::Column::EntryDate.gte(start));
    }
    if let Some(end) = window.end {
        query = query.filter(journal_entries::Column::EntryDate.lte(end));
    }
    if let Some(ids) = account_ids {
        query = query.filter(
            journal_entry_lines::Column::AccountId.is_in(ids.iter().map(|id| id.into_inner())),
        );
    }

    let rows = query
        .group_by(journal_entry_lines::Column::AccountId)
        .into_model::<MovementRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                AccountId::from_uuid(row.account_id),
                Movement::new(
                    from_cents(row.total_debits.unwrap_or_default()),
                    from_cents(row.total_credits.unwrap_or_default()),
                ),
            )
        })
        .collect())
}
