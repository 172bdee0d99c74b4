//! Business rule validation for ledger operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::Money;

use super::error::LedgerError;
use super::types::{EntryLineInput, EntryTotals};

/// Maximum length of an account code.
pub const MAX_ACCOUNT_CODE_LEN: usize = 32;

/// Minimum number of lines in a journal entry.
pub const MIN_ENTRY_LINES: usize = 2;

/// Validates an account code: 1-32 ASCII letters, digits, `_` or `-`.
///
/// # Errors
///
/// Returns `InvalidAccountCode` if the code does not match.
pub fn validate_account_code(code: &str) -> Result<(), LedgerError> {
    let valid = !code.is_empty()
        && code.len() <= MAX_ACCOUNT_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidAccountCode(code.to_string()))
    }
}

/// Validates an amount stored outside journal lines, such as an opening balance.
///
/// # Errors
///
/// Returns `InvalidAmount` if the amount is not a whole number of cents.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    Money::try_from_decimal(amount)
        .map(|_| ())
        .map_err(|e| LedgerError::InvalidAmount(e.to_string()))
}

/// Validates the number of lines.
///
/// # Errors
///
/// Returns `InsufficientLines` for fewer than two lines.
pub fn validate_line_count(lines: &[EntryLineInput]) -> Result<(), LedgerError> {
    if lines.len() < MIN_ENTRY_LINES {
        return Err(LedgerError::InsufficientLines(lines.len()));
    }
    Ok(())
}

/// Validates the amounts of a single line.
///
/// A line carries exactly one nonzero side, neither side is negative,
/// and both are whole cents.
///
/// # Errors
///
/// Returns `MalformedLine` describing the first broken rule.
pub fn validate_line(index: usize, line: &EntryLineInput) -> Result<(), LedgerError> {
    let malformed = |reason: &str| LedgerError::MalformedLine {
        line: index,
        reason: reason.to_string(),
    };

    if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
        return Err(malformed("amounts cannot be negative"));
    }

    match (line.debit.is_zero(), line.credit.is_zero()) {
        (true, true) => return Err(malformed("debit and credit are both zero")),
        (false, false) => return Err(malformed("debit and credit are both nonzero")),
        _ => {}
    }

    for amount in [line.debit, line.credit] {
        Money::try_from_decimal(amount).map_err(|e| malformed(&e.to_string()))?;
    }

    Ok(())
}

/// Calculates entry totals from line inputs.
#[must_use]
pub fn calculate_totals(lines: &[EntryLineInput]) -> EntryTotals {
    let total_debits: Decimal = lines.iter().map(|l| l.debit).sum();
    let total_credits: Decimal = lines.iter().map(|l| l.credit).sum();
    EntryTotals::new(total_debits, total_credits)
}

/// Validates that debits equal credits.
///
/// # Errors
///
/// Returns `ImbalancedEntry` carrying both totals.
pub fn validate_balanced(totals: &EntryTotals) -> Result<(), LedgerError> {
    if !totals.is_balanced {
        return Err(LedgerError::ImbalancedEntry {
            total_debits: totals.total_debits,
            total_credits: totals.total_credits,
        });
    }
    Ok(())
}

/// Validates an inclusive date window.
///
/// # Errors
///
/// Returns `InvalidDateRange` if `start` is after `end`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), LedgerError> {
    if start > end {
        return Err(LedgerError::InvalidDateRange { start, end });
    }
    Ok(())
}
