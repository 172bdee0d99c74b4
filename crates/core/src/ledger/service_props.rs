//! Property-based tests for LedgerService.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{AccountInfo, AccountType, EntryLineInput, RecordEntryInput};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn make_input(lines: Vec<EntryLineInput>) -> RecordEntryInput {
    RecordEntryInput {
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        reference_type: "JOURNAL".to_string(),
        reference_id: "J-1".to_string(),
        description: "Test entry".to_string(),
        lines,
        created_by: "tester".to_string(),
    }
}

/// Every code resolves to an active asset account.
fn open_chart(code: &str) -> Option<AccountInfo> {
    Some(AccountInfo {
        id: AccountId::new(),
        code: code.to_string(),
        account_type: AccountType::Asset,
        is_active: true,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any entry whose debit amounts are split across credits resolves with equal totals.
    #[test]
    fn prop_split_entries_resolve_balanced(
        amounts in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut lines: Vec<EntryLineInput> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| EntryLineInput::debit(format!("D{i}"), *a))
            .collect();
        lines.push(EntryLineInput::credit("C", total));

        let (resolved, totals) = LedgerService::validate_and_resolve(&make_input(lines), open_chart)?;

        prop_assert_eq!(resolved.len(), amounts.len() + 1);
        prop_assert_eq!(totals.total_debits, total);
        prop_assert_eq!(totals.total_credits, total);
        let resolved_debits: Decimal = resolved.iter().map(|l| l.debit).sum();
        let resolved_credits: Decimal = resolved.iter().map(|l| l.credit).sum();
        prop_assert_eq!(resolved_debits, resolved_credits);
    }

    /// Any mismatch between the two sides is reported with both totals.
    #[test]
    fn prop_mismatch_reports_both_totals(debit in positive_amount(), credit in positive_amount()) {
        prop_assume!(debit != credit);
        let input = make_input(vec![
            EntryLineInput::debit("A", debit),
            EntryLineInput::credit("B", credit),
        ]);

        let result = LedgerService::validate_and_resolve(&input, open_chart);
        prop_assert_eq!(
            result.unwrap_err(),
            LedgerError::ImbalancedEntry { total_debits: debit, total_credits: credit }
        );
    }

    /// Resolution never changes amounts or their order.
    #[test]
    fn prop_resolution_preserves_lines(amount in positive_amount()) {
        let input = make_input(vec![
            EntryLineInput::credit("B", amount),
            EntryLineInput::debit("A", amount),
        ]);

        let (resolved, _) = LedgerService::validate_and_resolve(&input, open_chart)?;
        prop_assert_eq!(resolved[0].credit, amount);
        prop_assert_eq!(resolved[0].account_code.as_str(), "B");
        prop_assert_eq!(resolved[1].debit, amount);
    }
}
