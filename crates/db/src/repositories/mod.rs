//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every repository speaks `tally_core` domain types and `LedgerError`.

pub mod account;
pub mod balance;
pub mod journal;
pub mod movement;
pub mod report;

pub use account::{AccountCursor, AccountRepository};
pub use balance::{BalanceRepository, LedgerDetail};
pub use journal::JournalRepository;
pub use movement::DateWindow;
pub use report::ReportRepository;

use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use tally_core::ledger::LedgerError;
use tally_shared::types::Money;

/// Rows fetched per round trip when no page size is configured.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Maps a storage error on a read path.
pub(crate) fn read_error(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// Maps a storage error inside an atomic write; the transaction is rolled back.
pub(crate) fn write_error(err: DbErr) -> LedgerError {
    LedgerError::TransactionFailure(err.to_string())
}

/// Returns true if the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Converts a decimal amount to cents for storage.
pub(crate) fn to_cents(amount: Decimal) -> Result<i64, LedgerError> {
    Money::try_from_decimal(amount)
        .map(Money::minor_units)
        .map_err(|e| LedgerError::InvalidAmount(e.to_string()))
}

/// Converts stored cents to a decimal amount.
pub(crate) fn from_cents(cents: i64) -> Decimal {
    Money::from_minor_units(cents).amount()
}
