//! Report repository: loads balances and hands them to `ReportService`.
//!
//! Movements are read before accounts. Opening balances never change and an
//! account's type is locked once lines reference it, so every account with
//! movement is present and classified the same way in the second read.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tally_core::ledger::validation::validate_date_range;
use tally_core::ledger::{Account, AccountBalance, AccountType, LedgerError, Movement};
use tally_core::reports::{
    BalanceSheetReport, ProfitAndLossReport, ReportService, TrialBalanceReport,
};
use tally_shared::types::AccountId;
use tracing::{debug, instrument};

use super::movement::{DateWindow, account_movements};
use super::read_error;
use crate::entities::{accounts, sea_orm_active_enums};

/// Report repository.
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

    /// Trial balance as of a date.
    ///
    /// Every account with a nonzero balance appears, including one
    /// deactivated after the date.
    #[instrument(skip(self))]
    pub async fn get_trial_balance(
        &self,
        as_of: NaiveDate,
    ) -> Result<TrialBalanceReport, LedgerError> {
        let balances = self.balances_as_of(as_of).await?;
        let report = ReportService::generate_trial_balance(as_of, balances);
        debug!(
            rows = report.rows.len(),
            is_balanced = report.totals.is_balanced,
            "trial balance generated"
        );
        Ok(report)
    }

    /// Profit and loss over an inclusive window; opening balances ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    #[instrument(skip(self))]
    pub async fn get_profit_and_loss(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProfitAndLossReport, LedgerError> {
        validate_date_range(start, end)?;

        let movements = account_movements(&self.db, DateWindow::between(start, end), None)
            .await
            .map_err(read_error)?;

        let income_types: Vec<sea_orm_active_enums::AccountType> =
            [AccountType::Revenue, AccountType::Expense]
                .into_iter()
                .map(Into::into)
                .collect();
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::AccountType.is_in(income_types))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(read_error)?;

        let activity = with_movements(
            accounts.into_iter().map(Account::from),
            movements,
            AccountBalance::period_activity,
        );

        Ok(ReportService::generate_profit_and_loss(start, end, activity))
    }

    /// Balance sheet as of a date, with current earnings on the equity side.
    #[instrument(skip(self))]
    pub async fn get_balance_sheet(
        &self,
        as_of: NaiveDate,
    ) -> Result<BalanceSheetReport, LedgerError> {
        let balances = self.balances_as_of(as_of).await?;
        let report = ReportService::generate_balance_sheet(as_of, balances);
        debug!(is_balanced = report.is_balanced, "balance sheet generated");
        Ok(report)
    }

    async fn balances_as_of(&self, as_of: NaiveDate) -> Result<Vec<AccountBalance>, LedgerError> {
        let movements = account_movements(&self.db, DateWindow::up_to(as_of), None)
            .await
            .map_err(read_error)?;

        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(read_error)?;

        Ok(with_movements(
            accounts.into_iter().map(Account::from),
            movements,
            AccountBalance::with_opening,
        ))
    }
}

fn with_movements<F>(
    accounts: impl Iterator<Item = Account>,
    mut movements: HashMap<AccountId, Movement>,
    balance: F,
) -> Vec<AccountBalance>
where
    F: Fn(&Account, Movement) -> AccountBalance,
{
    accounts
        .map(|account| {
            let movement = movements.remove(&account.id).unwrap_or_default();
            balance(&account, movement)
        })
        .collect()
}
