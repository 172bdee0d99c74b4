//! Ledger error types for validation and storage errors.
//!
//! Every validation error is raised before anything is written. Only
//! `TransactionFailure` is produced after a write began, and it always
//! means the storage transaction was rolled back.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Chart of Accounts Errors ==========
    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateAccount(String),

    /// Parent account is missing or the link would create a cycle.
    #[error("Invalid account hierarchy: {0}")]
    InvalidHierarchy(String),

    /// No account has the given code.
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    /// Account code is empty, too long or has characters outside `[A-Za-z0-9_-]`.
    #[error("Invalid account code '{0}'")]
    InvalidAccountCode(String),

    /// Account type cannot change once lines reference the account.
    #[error("Cannot change account type for account {0} because it has journal lines")]
    AccountTypeLocked(String),

    /// Account cannot be deactivated while its balance is nonzero.
    #[error("Account {code} has a nonzero balance of {balance}")]
    NonZeroBalance {
        /// The account code.
        code: String,
        /// The current balance.
        balance: Decimal,
    },

    /// System accounts cannot be deactivated.
    #[error("Account {0} is a system account")]
    SystemAccount(String),

    /// Account is inactive and cannot receive postings.
    #[error("Account {0} is inactive")]
    InactiveAccount(String),

    // ========== Entry Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines, got {0}")]
    InsufficientLines(usize),

    /// A line must carry exactly one nonzero, non-negative, whole-cent amount.
    #[error("Line {line} is malformed: {reason}")]
    MalformedLine {
        /// Zero-based position of the line in the input.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debits: {total_debits}, Credits: {total_credits}")]
    ImbalancedEntry {
        /// Sum of the debit amounts.
        total_debits: Decimal,
        /// Sum of the credit amounts.
        total_credits: Decimal,
    },

    /// An amount outside a journal line cannot be represented in cents.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // ========== Query Errors ==========
    /// No entry has the given entry number.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    /// Start date is after end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    // ========== Storage Errors ==========
    /// The atomic write failed and was rolled back.
    #[error("Transaction failed and was rolled back: {0}")]
    TransactionFailure(String),

    /// Database error on a read path.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::InvalidHierarchy(_) => "INVALID_HIERARCHY",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::InvalidAccountCode(_) => "INVALID_ACCOUNT_CODE",
            Self::AccountTypeLocked(_) => "ACCOUNT_TYPE_LOCKED",
            Self::NonZeroBalance { .. } => "NON_ZERO_BALANCE",
            Self::SystemAccount(_) => "SYSTEM_ACCOUNT",
            Self::InactiveAccount(_) => "INACTIVE_ACCOUNT",
            Self::InsufficientLines(_) => "INSUFFICIENT_LINES",
            Self::MalformedLine { .. } => "MALFORMED_LINE",
            Self::ImbalancedEntry { .. } => "IMBALANCED_ENTRY",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::TransactionFailure(_) => "TRANSACTION_FAILURE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionFailure(_))
    }

    /// Returns true for errors detected before anything is written.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::TransactionFailure(_) | Self::Database(_) | Self::EntryNotFound(_)
        )
    }
}
