//! Ledger service for journal entry validation and resolution.
//!
//! This module provides the core business logic for validating and resolving
//! journal entries before they are persisted to the database.

use super::error::LedgerError;
use super::types::{AccountInfo, EntryTotals, RecordEntryInput, ResolvedLine};
use super::validation::{calculate_totals, validate_balanced, validate_line, validate_line_count};

/// Ledger service for journal entry validation and resolution.
///
/// This service contains pure business logic with no database dependencies.
/// Storage supplies account lookups through a closure.
pub struct LedgerService;

impl LedgerService {
    /// Validate and resolve a journal entry before persisting.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// 1. At least two lines
    /// 2. Each line has exactly one nonzero, non-negative, whole-cent side
    /// 3. Every account code resolves (the first unresolved code is reported)
    /// 4. Every account is active
    /// 5. Total debits equal total credits
    ///
    /// # Arguments
    ///
    /// * `input` - The entry to validate
    /// * `account_lookup` - Resolves an account code, `None` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn validate_and_resolve<A>(
        input: &RecordEntryInput,
        account_lookup: A,
    ) -> Result<(Vec<ResolvedLine>, EntryTotals), LedgerError>
    where
        A: Fn(&str) -> Option<AccountInfo>,
    {
        validate_line_count(&input.lines)?;

        for (index, line) in input.lines.iter().enumerate() {
            validate_line(index, line)?;
        }

        let accounts = input
            .lines
            .iter()
            .map(|line| {
                account_lookup(&line.account_code)
                    .ok_or_else(|| LedgerError::UnknownAccount(line.account_code.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(inactive) = accounts.iter().find(|a| !a.is_active) {
            return Err(LedgerError::InactiveAccount(inactive.code.clone()));
        }

        let totals = calculate_totals(&input.lines);
        validate_balanced(&totals)?;

        let resolved = input
            .lines
            .iter()
            .zip(accounts)
            .map(|(line, account)| ResolvedLine {
                account_id: account.id,
                account_code: account.code,
                account_type: account.account_type,
                debit: line.debit,
                credit: line.credit,
                description: line.description.clone(),
            })
            .collect();

        Ok((resolved, totals))
    }
}
