//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Domain types for accounts and journal entries
//! - The natural-sign balance convention
//! - Business rule validation
//! - Entry numbering
//! - Reversing entries
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod numbering;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::{AccountBalance, Movement, convert_direction, debit_positive, signed_movement};
pub use error::LedgerError;
pub use numbering::{format_entry_number, numbering_period, parse_entry_number};
pub use reversal::{REVERSAL_REFERENCE_TYPE, ReversalService};
pub use service::LedgerService;
pub use types::{
    Account, AccountFilter, AccountInfo, AccountType, AccountUpdate, EntryLineInput, EntryTotals,
    JournalEntry, JournalEntryLine, NewAccount, NormalSide, RecordEntryInput, ResolvedLine,
    UnknownAccountType,
};
