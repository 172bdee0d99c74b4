//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use crate::ledger::balance::AccountBalance;
use crate::ledger::types::AccountType;

/// One account in the trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Sum of debit lines up to the report date.
    pub total_debits: Decimal,
    /// Sum of credit lines up to the report date.
    pub total_credits: Decimal,
    /// Balance in the account's natural direction.
    pub balance: Decimal,
    /// Balance presented in the debit column (zero if it sits on the credit side).
    pub debit_balance: Decimal,
    /// Balance presented in the credit column (zero if it sits on the debit side).
    pub credit_balance: Decimal,
}

impl From<AccountBalance> for TrialBalanceRow {
    fn from(balance: AccountBalance) -> Self {
        let debit_positive = balance.debit_positive();
        let (debit_balance, credit_balance) = if debit_positive >= Decimal::ZERO {
            (debit_positive, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -debit_positive)
        };

        Self {
            account_id: balance.account_id,
            code: balance.code,
            name: balance.name,
            account_type: balance.account_type,
            total_debits: balance.total_debits,
            total_credits: balance.total_credits,
            balance: balance.balance,
            debit_balance,
            credit_balance,
        }
    }
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Accounts with a nonzero balance, ordered by code.
    pub rows: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

impl TrialBalanceReport {
    /// Sum of every row's balance multiplied by its natural sign.
    ///
    /// Zero whenever every entry and the opening balances are balanced.
    #[must_use]
    pub fn natural_signed_sum(&self) -> Decimal {
        self.rows
            .iter()
            .map(|r| r.account_type.natural_sign() * r.balance)
            .sum()
    }
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total of the debit column.
    pub total_debits: Decimal,
    /// Total of the credit column.
    pub total_credits: Decimal,
    /// Whether the columns agree.
    pub is_balanced: bool,
}

/// A group of account balances with its total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Section total in the section's natural direction.
    pub total: Decimal,
    /// Accounts in this section, ordered by code.
    pub accounts: Vec<AccountBalance>,
}

/// Profit & loss report for an inclusive date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLossReport {
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Revenue movements inside the window.
    pub revenue: ReportSection,
    /// Expense movements inside the window.
    pub expenses: ReportSection,
    /// Total revenue.
    pub total_revenue: Decimal,
    /// Total expenses.
    pub total_expenses: Decimal,
    /// Revenue minus expenses.
    pub net_profit: Decimal,
}

/// Balance sheet report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Assets section.
    pub assets: ReportSection,
    /// Liabilities section.
    pub liabilities: ReportSection,
    /// Equity section (posted equity accounts only).
    pub equity: ReportSection,
    /// Revenue minus expense balances as of the date, not yet closed to equity.
    pub current_earnings: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Equity accounts plus current earnings.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// One posted line of an account, with its entry header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDetailLine {
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry number.
    pub entry_number: String,
    /// Line description, falling back to the entry description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Reference type of the entry.
    pub reference_type: String,
    /// Reference id of the entry.
    pub reference_id: String,
}
