//! Concurrent writers against one ledger.
//!
//! Every writer waits on a barrier so the entries race for the same
//! numbering counter and the same account rows. The ledger sits on a SQLite
//! file behind a pool of several connections, so transactions overlap.

#![allow(clippy::cast_possible_truncation)]

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{
    create_accounts, create_retail_chart, date, entry_count, setup_file_ledger, simple_entry,
};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::ledger::{AccountType, AccountUpdate, LedgerError, parse_entry_number};
use tokio::sync::Barrier;

const WRITERS: usize = 20;
const POOL_SIZE: u32 = 8;

#[tokio::test]
async fn test_concurrent_entries_get_unique_sequential_numbers() {
    let (ledger, db, _file) = setup_file_ledger(POOL_SIZE).await;
    create_retail_chart(&ledger).await;

    let barrier = Arc::new(Barrier::new(WRITERS));
    let writes = (0..WRITERS).map(|i| {
        let journal = ledger.journal.clone();
        let barrier = Arc::clone(&barrier);
        async move {
            barrier.wait().await;
            let mut input = simple_entry(date(2026, 9, 1), "CASH", "SALES", dec!(10));
            input.reference_id = format!("POS-{i}");
            journal.record_entry(input).await
        }
    });

    let entries: Vec<_> = join_all(writes)
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    let numbers: HashSet<_> = entries.iter().map(|e| e.entry_number.clone()).collect();
    assert_eq!(numbers.len(), WRITERS);

    let mut counters: Vec<i64> = entries
        .iter()
        .map(|e| parse_entry_number(&e.entry_number).unwrap().2)
        .collect();
    counters.sort_unstable();
    let expected: Vec<i64> = (1..=i64::try_from(WRITERS).unwrap()).collect();
    assert_eq!(counters, expected);

    assert_eq!(entry_count(&db).await, WRITERS as u64);

    // what each writer returned is what was stored
    for entry in &entries {
        let stored = ledger.journal.get_entry(&entry.entry_number).await.unwrap();
        assert_eq!(stored.id, entry.id);
    }

    let cash = ledger.accounts.get_account_by_code("CASH").await.unwrap();
    let computed = ledger.balances.get_account_balance("CASH", None).await.unwrap();
    assert_eq!(cash.current_balance, dec!(200));
    assert_eq!(computed.balance, cash.current_balance);
}

#[tokio::test]
async fn test_unrelated_entries_commit_side_by_side() {
    let (ledger, db, _file) = setup_file_ledger(POOL_SIZE).await;
    create_retail_chart(&ledger).await;

    let pairs = [
        ("CASH", "SALES"),
        ("INVENTORY", "AP"),
        ("RENT", "CAPITAL"),
        ("AR", "SALES"),
    ];
    let barrier = Arc::new(Barrier::new(WRITERS));
    let writes = (0..WRITERS).map(|i| {
        let journal = ledger.journal.clone();
        let barrier = Arc::clone(&barrier);
        let (debit, credit) = pairs[i % pairs.len()];
        async move {
            barrier.wait().await;
            let mut input = simple_entry(date(2026, 9, 3), debit, credit, dec!(1.25));
            input.reference_id = format!("DOC-{i}");
            journal.record_entry(input).await
        }
    });

    let results = join_all(writes).await;
    assert!(results.iter().all(Result::is_ok), "{results:?}");
    assert_eq!(entry_count(&db).await, WRITERS as u64);

    let report = ledger.reports.get_trial_balance(date(2026, 9, 30)).await.unwrap();
    assert!(report.totals.is_balanced);
    assert_eq!(report.totals.total_debits, dec!(25));
}

#[tokio::test]
async fn test_mixed_valid_and_invalid_writers() {
    let (ledger, db, _file) = setup_file_ledger(POOL_SIZE).await;
    create_retail_chart(&ledger).await;

    let barrier = Arc::new(Barrier::new(WRITERS));
    let writes = (0..WRITERS).map(|i| {
        let journal = ledger.journal.clone();
        let barrier = Arc::clone(&barrier);
        async move {
            barrier.wait().await;
            let mut input = simple_entry(date(2026, 9, 2), "RENT", "CASH", dec!(5));
            if i % 2 == 1 {
                input.lines[1].credit = dec!(4);
            }
            journal.record_entry(input).await
        }
    });

    let results = join_all(writes).await;
    let (ok, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);

    assert_eq!(ok.len(), WRITERS / 2);
    assert!(failed.into_iter().all(|r| matches!(
        r,
        Err(LedgerError::ImbalancedEntry { .. })
    )));
    assert_eq!(entry_count(&db).await, (WRITERS / 2) as u64);

    let report = ledger.reports.get_trial_balance(date(2026, 9, 30)).await.unwrap();
    assert_eq!(report.natural_signed_sum(), Decimal::ZERO);
    let rent = report.rows.iter().find(|r| r.code == "RENT").unwrap();
    assert_eq!(rent.balance, dec!(50));
}

#[tokio::test]
async fn test_type_change_racing_postings_keeps_balances_consistent() {
    let (ledger, _db, _file) = setup_file_ledger(POOL_SIZE).await;
    create_accounts(
        &ledger,
        &[("CASH", AccountType::Asset), ("MISC", AccountType::Expense)],
    )
    .await;

    let barrier = Arc::new(Barrier::new(WRITERS + 1));
    let writes = (0..WRITERS).map(|i| {
        let journal = ledger.journal.clone();
        let barrier = Arc::clone(&barrier);
        async move {
            barrier.wait().await;
            let mut input = simple_entry(date(2026, 9, 4), "MISC", "CASH", dec!(3));
            input.reference_id = format!("MISC-{i}");
            journal.record_entry(input).await
        }
    });
    let retype = {
        let accounts = ledger.accounts.clone();
        let barrier = Arc::clone(&barrier);
        async move {
            barrier.wait().await;
            accounts
                .update_account(
                    "MISC",
                    AccountUpdate {
                        account_type: Some(AccountType::Revenue),
                        ..AccountUpdate::default()
                    },
                )
                .await
        }
    };

    let (results, retyped) = futures::join!(join_all(writes), retype);

    assert!(results.iter().all(|r| matches!(
        r,
        Ok(_) | Err(LedgerError::TransactionFailure(_))
    )));
    match retyped {
        Ok(account) => assert_eq!(account.account_type, AccountType::Revenue),
        Err(err) => assert_eq!(err, LedgerError::AccountTypeLocked("MISC".to_string())),
    }

    // the cached balance always agrees with the history read in the final type
    let misc = ledger.accounts.get_account_by_code("MISC").await.unwrap();
    let computed = ledger.balances.get_account_balance("MISC", None).await.unwrap();
    assert_eq!(computed.balance, misc.current_balance);

    let report = ledger.reports.get_trial_balance(date(2026, 9, 30)).await.unwrap();
    assert!(report.totals.is_balanced);
}
