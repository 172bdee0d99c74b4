//! Integration tests for report generation over a populated ledger.

mod common;

use common::{create_retail_chart, date, setup_ledger, simple_entry};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::ledger::{AccountType, LedgerError, NewAccount};
use tally_db::Ledger;

/// A month of retail activity spread over January and February 2026.
async fn post_retail_month(ledger: &Ledger) {
    let postings = [
        (date(2026, 1, 2), "CASH", "CAPITAL", dec!(20000)),
        (date(2026, 1, 3), "INVENTORY", "AP", dec!(6000)),
        (date(2026, 1, 10), "CASH", "SALES", dec!(4200.50)),
        (date(2026, 1, 10), "COGS", "INVENTORY", dec!(2100.25)),
        (date(2026, 1, 15), "AR", "SALES", dec!(800)),
        (date(2026, 1, 31), "RENT", "CASH", dec!(1500)),
        (date(2026, 2, 1), "AP", "CASH", dec!(3000)),
        (date(2026, 2, 5), "CASH", "SALES", dec!(999.99)),
        (date(2026, 2, 28), "RENT", "CASH", dec!(1500)),
    ];
    for (day, debit, credit, amount) in postings {
        ledger
            .journal
            .record_entry(simple_entry(day, debit, credit, amount))
            .await
            .unwrap();
    }
}

// ============================================================================
// Trial balance
// ============================================================================

#[tokio::test]
async fn test_trial_balance_is_zero_sum() {
    let (ledger, _db) = setup_ledger().await;
    create_retail_chart(&ledger).await;
    post_retail_month(&ledger).await;

    let report = ledger.reports.get_trial_balance(date(2026, 1, 31)).await.unwrap();

    assert_eq!(report.natural_signed_sum(), Decimal::ZERO);
    assert!(report.totals.is_balanced);
    assert_eq!(report.totals.total_debits, report.totals.total_credits);
    assert!(report.rows.iter().all(|r| !r.balance.is_zero()));

    let codes: Vec<_> = report.rows.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(
        codes,
        ["AP", "AR", "CAPITAL", "CASH", "COGS", "INVENTORY", "RENT", "SALES"]
    );

    let cash = report.rows.iter().find(|r| r.code == "CASH").unwrap();
    assert_eq!(cash.balance, dec!(22700.50));
    assert_eq!(cash.total_debits, dec!(24200.50));
    assert_eq!(cash.total_credits, dec!(1500));
    assert_eq!(cash.debit_balance, dec!(22700.50));
}

#[tokio::test]
async fn test_trial_balance_is_deterministic() {
    let (ledger, _db) = setup_ledger().await;
    create_retail_chart(&ledger).await;
    post_retail_month(&ledger).await;

    let first = ledger.reports.get_trial_balance(date(2026, 2, 28)).await.unwrap();
    let second = ledger.reports.get_trial_balance(date(2026, 2, 28)).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_trial_balance_before_any_activity() {
    let (ledger, _db) = setup_ledger().await;
    create_retail_chart(&ledger).await;
    post_retail_month(&ledger).await;

    let report = ledger.reports.get_trial_balance(date(2025, 12, 31)).await.unwrap();
    assert!(report.rows.is_empty());
    assert!(report.totals.is_balanced);
}

#[tokio::test]
async fn test_trial_balance_with_opening_balances() {
    let (ledger, _db) = setup_ledger().await;
    ledger
        .accounts
        .create_account(
            NewAccount::new("CASH", "Cash", AccountType::Asset).with_opening_balance(dec!(900)),
        )
        .await
        .unwrap();
    ledger
        .accounts
        .create_account(
            NewAccount::new("CAPITAL", "Capital", AccountType::Equity)
                .with_opening_balance(dec!(900)),
        )
        .await
        .unwrap();

    let report = ledger.reports.get_trial_balance(date(2026, 1, 1)).await.unwrap();
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.totals.total_debits, dec!(900));
    assert_eq!(report.totals.total_credits, dec!(900));
}

#[tokio::test]
async fn test_deactivated_account_still_reported_for_past_dates() {
    let (ledger, _db) = setup_ledger().await;
    create_retail_chart(&ledger).await;
    ledger
        .journal
        .record_entry(simple_entry(date(2026, 3, 1), "RENT", "CASH", dec!(100)))
        .await
        .unwrap();
    ledger
        .journal
        .record_entry(simple_entry(date(2026, 3, 20), "CASH", "RENT", dec!(100)))
        .await
        .unwrap();
    ledger.accounts.deactivate_account("RENT").await.unwrap();

    let mid_month = ledger.reports.get_trial_balance(date(2026, 3, 10)).await.unwrap();
    assert!(mid_month.rows.iter().any(|r| r.code == "RENT"));
    assert_eq!(mid_month.natural_signed_sum(), Decimal::ZERO);

    let month_end = ledger.reports.get_trial_balance(date(2026, 3, 31)).await.unwrap();
    assert!(month_end.rows.is_empty());
}

// ============================================================================
// Profit and loss
// ============================================================================

#[tokio::test]
async fn test_profit_and_loss_window() {
    let (ledger, _db) = setup_ledger().await;
    create_retail_chart(&ledger).await;
    post_retail_month(&ledger).await;

    let january = ledger
        .reports
        .get_profit_and_loss(date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();

    assert_eq!(january.total_revenue, dec!(5000.50));
    assert_eq!(january.total_expenses, dec!(3600.25));
    assert_eq!(january.net_profit, dec!(1400.25));
    let expense_codes: Vec<_> = january.expenses.accounts.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(expense_codes, ["COGS", "RENT"]);

    let february = ledger
        .reports
        .get_profit_and_loss(date(2026, 2, 1), date(2026, 2, 28))
        .await
        .unwrap();
    assert_eq!(february.total_revenue, dec!(999.99));
    assert_eq!(february.total_expenses, dec!(1500));
    assert_eq!(february.net_profit, dec!(-500.01));
}

#[tokio::test]
async fn test_profit_and_loss_ignores_opening_balances() {
    let (ledger, _db) = setup_ledger().await;
    ledger
        .accounts
        .create_account(
            NewAccount::new("SALES", "Sales", AccountType::Revenue)
                .with_opening_balance(dec!(5000)),
        )
        .await
        .unwrap();

    let report = ledger
        .reports
        .get_profit_and_loss(date(2026, 1, 1), date(2026, 12, 31))
        .await
        .unwrap();
    assert_eq!(report.net_profit, Decimal::ZERO);
    assert!(report.revenue.accounts.is_empty());
}

#[tokio::test]
async fn test_profit_and_loss_invalid_range() {
    let (ledger, _db) = setup_ledger().await;

    let err = ledger
        .reports
        .get_profit_and_loss(date(2026, 2, 1), date(2026, 1, 31))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidDateRange {
            start: date(2026, 2, 1),
            end: date(2026, 1, 31),
        }
    );
}

// ============================================================================
// Balance sheet
// ============================================================================

#[tokio::test]
async fn test_balance_sheet_identity_holds_every_day() {
    let (ledger, _db) = setup_ledger().await;
    create_retail_chart(&ledger).await;
    post_retail_month(&ledger).await;

    let mut day = date(2026, 1, 1);
    while day <= date(2026, 3, 1) {
        let sheet = ledger.reports.get_balance_sheet(day).await.unwrap();
        assert_eq!(
            sheet.total_assets, sheet.liabilities_and_equity,
            "identity broken on {day}"
        );
        assert!(sheet.is_balanced);
        day = day.succ_opt().unwrap();
    }
}

#[tokio::test]
async fn test_balance_sheet_sections() {
    let (ledger, _db) = setup_ledger().await;
    create_retail_chart(&ledger).await;
    post_retail_month(&ledger).await;

    let sheet = ledger.reports.get_balance_sheet(date(2026, 1, 31)).await.unwrap();

    // CASH 22700.50 + AR 800 + INVENTORY 3899.75
    assert_eq!(sheet.total_assets, dec!(27400.25));
    assert_eq!(sheet.total_liabilities, dec!(6000));
    assert_eq!(sheet.current_earnings, dec!(1400.25));
    assert_eq!(sheet.total_equity, dec!(21400.25));
    assert_eq!(sheet.equity.accounts.len(), 1);
    assert_eq!(sheet.equity.accounts[0].code, "CAPITAL");

    let pnl = ledger
        .reports
        .get_profit_and_loss(date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();
    assert_eq!(pnl.net_profit, sheet.current_earnings);
}
