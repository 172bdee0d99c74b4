//! Reversal of posted journal entries.
//!
//! Posted entries are never edited or deleted. A correction is a new entry
//! that swaps every line's debit and credit, linked back to the original
//! through its reference pair.

use chrono::NaiveDate;

use super::types::{EntryLineInput, JournalEntry, RecordEntryInput};

/// Reference type of entries produced by a reversal.
pub const REVERSAL_REFERENCE_TYPE: &str = "REVERSAL";

/// Stateless service for building reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the input that reverses `original`.
    ///
    /// For each original line the debit becomes a credit and the credit a
    /// debit. The reversal references the original entry number.
    #[must_use]
    pub fn build_reversal(
        original: &JournalEntry,
        entry_date: NaiveDate,
        created_by: impl Into<String>,
    ) -> RecordEntryInput {
        let lines = original
            .lines
            .iter()
            .map(|line| EntryLineInput {
                account_code: line.account_code.clone(),
                debit: line.credit,
                credit: line.debit,
                description: Some(format!(
                    "Reversal: {}",
                    line.description.as_deref().unwrap_or_default()
                )),
            })
            .collect();

        RecordEntryInput {
            entry_date,
            reference_type: REVERSAL_REFERENCE_TYPE.to_string(),
            reference_id: original.entry_number.clone(),
            description: format!("Reversal of {}: {}", original.entry_number, original.description),
            lines,
            created_by: created_by.into(),
        }
    }
}
