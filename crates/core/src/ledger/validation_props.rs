//! Property-based tests for journal line validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::EntryLineInput;
use super::validation::{calculate_totals, validate_balanced, validate_line, validate_line_count};

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a negative amount.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy to generate a one-sided line.
fn line_strategy() -> impl Strategy<Value = EntryLineInput> {
    (any::<bool>(), positive_amount()).prop_map(|(is_debit, amount)| {
        if is_debit {
            EntryLineInput::debit("ACC", amount)
        } else {
            EntryLineInput::credit("ACC", amount)
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any one-sided positive whole-cent line is well formed.
    #[test]
    fn prop_one_sided_lines_accepted(line in line_strategy()) {
        prop_assert!(validate_line(0, &line).is_ok());
    }

    /// Negative amounts are always malformed, whichever side carries them.
    #[test]
    fn prop_negative_amounts_rejected(amount in negative_amount(), on_debit in any::<bool>()) {
        let line = if on_debit {
            EntryLineInput::debit("ACC", amount)
        } else {
            EntryLineInput::credit("ACC", amount)
        };
        let rejected = matches!(validate_line(0, &line), Err(LedgerError::MalformedLine { .. }));
        prop_assert!(rejected);
    }

    /// Two-sided lines are malformed.
    #[test]
    fn prop_two_sided_lines_rejected(debit in positive_amount(), credit in positive_amount()) {
        let line = EntryLineInput {
            account_code: "ACC".to_string(),
            debit,
            credit,
            description: None,
        };
        prop_assert!(validate_line(0, &line).is_err());
    }

    /// Mirroring every line on the opposite side yields a balanced entry.
    #[test]
    fn prop_mirrored_lines_balance(lines in prop::collection::vec(line_strategy(), 1..10)) {
        let mut all = lines.clone();
        all.extend(lines.iter().map(|l| EntryLineInput {
            account_code: "OFFSET".to_string(),
            debit: l.credit,
            credit: l.debit,
            description: None,
        }));

        prop_assert!(validate_line_count(&all).is_ok());
        let totals = calculate_totals(&all);
        prop_assert!(validate_balanced(&totals).is_ok());
        prop_assert_eq!(totals.total_debits, totals.total_credits);
    }

    /// Adding a cent to one side of a balanced entry always breaks the balance
    /// and the error reports the exact totals.
    #[test]
    fn prop_off_by_one_cent_rejected(amount in positive_amount()) {
        let lines = vec![
            EntryLineInput::debit("A", amount + Decimal::new(1, 2)),
            EntryLineInput::credit("B", amount),
        ];
        let totals = calculate_totals(&lines);
        prop_assert_eq!(
            validate_balanced(&totals),
            Err(LedgerError::ImbalancedEntry {
                total_debits: amount + Decimal::new(1, 2),
                total_credits: amount,
            })
        );
    }
}
