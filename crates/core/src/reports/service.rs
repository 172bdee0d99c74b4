//! Report generation service.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{
    BalanceSheetReport, ProfitAndLossReport, ReportSection, TrialBalanceReport, TrialBalanceRow,
    TrialBalanceTotals,
};
use crate::ledger::balance::AccountBalance;
use crate::ledger::types::AccountType;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance report from balances as of `as_of`.
    ///
    /// Accounts with a zero balance are left out. Each balance lands in the
    /// debit or credit column by its sign, so the columns agree whenever the
    /// ledger is balanced.
    #[must_use]
    pub fn generate_trial_balance(
        as_of: NaiveDate,
        balances: Vec<AccountBalance>,
    ) -> TrialBalanceReport {
        let rows: Vec<TrialBalanceRow> = Self::non_zero_sorted(balances)
            .into_iter()
            .map(TrialBalanceRow::from)
            .collect();

        let total_debits: Decimal = rows.iter().map(|r| r.debit_balance).sum();
        let total_credits: Decimal = rows.iter().map(|r| r.credit_balance).sum();

        TrialBalanceReport {
            as_of,
            rows,
            totals: TrialBalanceTotals {
                total_debits,
                total_credits,
                is_balanced: total_debits == total_credits,
            },
        }
    }

    /// Generates a profit & loss report from window activity.
    ///
    /// `activity` should hold revenue and expense movements inside the window
    /// with opening balances ignored; other account types are skipped.
    #[must_use]
    pub fn generate_profit_and_loss(
        period_start: NaiveDate,
        period_end: NaiveDate,
        activity: Vec<AccountBalance>,
    ) -> ProfitAndLossReport {
        let mut revenue = ReportSection::default();
        let mut expenses = ReportSection::default();

        for account in Self::non_zero_sorted(activity) {
            match account.account_type {
                AccountType::Revenue => Self::add_to_section(&mut revenue, account),
                AccountType::Expense => Self::add_to_section(&mut expenses, account),
                _ => {}
            }
        }

        let total_revenue = revenue.total;
        let total_expenses = expenses.total;

        ProfitAndLossReport {
            period_start,
            period_end,
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_profit: total_revenue - total_expenses,
        }
    }

    /// Generates a balance sheet from balances as of `as_of`.
    ///
    /// Revenue and expense balances are folded into a current earnings line
    /// on the equity side, so Assets = Liabilities + Equity holds without a
    /// closing entry.
    #[must_use]
    pub fn generate_balance_sheet(
        as_of: NaiveDate,
        balances: Vec<AccountBalance>,
    ) -> BalanceSheetReport {
        let mut assets = ReportSection::default();
        let mut liabilities = ReportSection::default();
        let mut equity = ReportSection::default();
        let mut current_earnings = Decimal::ZERO;

        for account in Self::non_zero_sorted(balances) {
            match account.account_type {
                AccountType::Asset => Self::add_to_section(&mut assets, account),
                AccountType::Liability => Self::add_to_section(&mut liabilities, account),
                AccountType::Equity => Self::add_to_section(&mut equity, account),
                AccountType::Revenue => current_earnings += account.balance,
                AccountType::Expense => current_earnings -= account.balance,
            }
        }

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total + current_earnings;
        let liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            as_of,
            assets,
            liabilities,
            equity,
            current_earnings,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced: total_assets == liabilities_and_equity,
        }
    }

    fn non_zero_sorted(mut balances: Vec<AccountBalance>) -> Vec<AccountBalance> {
        balances.retain(|b| !b.balance.is_zero());
        balances.sort_by(|a, b| a.code.cmp(&b.code));
        balances
    }

    fn add_to_section(section: &mut ReportSection, account: AccountBalance) {
        section.total += account.balance;
        section.accounts.push(account);
    }
}
