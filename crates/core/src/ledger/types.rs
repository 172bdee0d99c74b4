//! Ledger domain types for the chart of accounts and journal entries.
//!
//! This module defines the core types used for recording and reading
//! balanced journal entries in the double-entry bookkeeping system.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, JournalEntryId, JournalLineId};
use thiserror::Error;

/// Account classification.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, receivables, inventory).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

/// The side on which an account's balance naturally increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Asset and Expense accounts.
    Debit,
    /// Liability, Equity and Revenue accounts.
    Credit,
}

impl AccountType {
    /// All account types in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the side on which the balance of this type increases.
    #[must_use]
    pub const fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }

    /// Returns `+1` for debit-normal types and `-1` for credit-normal types.
    ///
    /// Every balance in the ledger is derived through this sign.
    #[must_use]
    pub const fn natural_sign(self) -> Decimal {
        match self.normal_side() {
            NormalSide::Debit => Decimal::ONE,
            NormalSide::Credit => Decimal::NEGATIVE_ONE,
        }
    }

    /// Returns true for types reported on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Returns true for types reported on the profit & loss statement.
    #[must_use]
    pub const fn is_income_statement(self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }

    /// Returns the lowercase storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an account type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown account type: {0}")]
pub struct UnknownAccountType(pub String);

impl std::str::FromStr for AccountType {
    type Err = UnknownAccountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(UnknownAccountType(s.to_string())),
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID.
    pub id: AccountId,
    /// Unique, immutable account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-form notes.
    pub description: Option<String>,
    /// Account classification.
    pub account_type: AccountType,
    /// Parent account in the hierarchy.
    pub parent_id: Option<AccountId>,
    /// Opening balance in the account's natural direction.
    pub opening_balance: Decimal,
    /// Cached balance: opening balance plus every posted line.
    pub current_balance: Decimal,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
    /// System accounts cannot be deactivated.
    pub is_system_account: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Account code (letters, digits, `_`, `-`).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Opening balance in the account's natural direction.
    pub opening_balance: Decimal,
    /// Code of the parent account, if any.
    pub parent_code: Option<String>,
    /// Free-form notes.
    pub description: Option<String>,
    /// Marks an account the ledger's owner relies on, such as retained earnings.
    pub is_system_account: bool,
}

impl NewAccount {
    /// Creates an account definition with a zero opening balance and no parent.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            opening_balance: Decimal::ZERO,
            parent_code: None,
            description: None,
            is_system_account: false,
        }
    }

    /// Sets the opening balance.
    #[must_use]
    pub fn with_opening_balance(mut self, opening_balance: Decimal) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    /// Sets the parent account code.
    #[must_use]
    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the account as a system account.
    #[must_use]
    pub const fn system(mut self) -> Self {
        self.is_system_account = true;
        self
    }
}

/// Input for updating an account. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New account type (only while no line references the account).
    pub account_type: Option<AccountType>,
    /// New parent code; `Some(None)` detaches the account from its parent.
    pub parent_code: Option<Option<String>>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
}

impl AccountFilter {
    /// Returns true if the account passes the filter.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        self.account_type.is_none_or(|t| t == account.account_type)
            && self.is_active.is_none_or(|a| a == account.is_active)
    }
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLineInput {
    /// Code of the account to post to.
    pub account_code: String,
    /// Debit amount (zero if credit).
    pub debit: Decimal,
    /// Credit amount (zero if debit).
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl EntryLineInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Sets the line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for recording a journal entry.
///
/// External modules (sales, purchasing, payroll) build one of these per
/// business event and hand it to the journal writer.
#[derive(Debug, Clone)]
pub struct RecordEntryInput {
    /// Accounting date of the entry.
    pub entry_date: NaiveDate,
    /// Kind of originating document (e.g. `SALE`, `PURCHASE`).
    pub reference_type: String,
    /// Identifier of the originating document.
    pub reference_id: String,
    /// Entry description.
    pub description: String,
    /// The lines (must have at least 2).
    pub lines: Vec<EntryLineInput>,
    /// Opaque identity of the creator.
    pub created_by: String,
}

/// Account information needed to validate a line.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// The account code.
    pub code: String,
    /// The account type.
    pub account_type: AccountType,
    /// Whether the account accepts postings.
    pub is_active: bool,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            code: account.code.clone(),
            account_type: account.account_type,
            is_active: account.is_active,
        }
    }
}

/// A validated line with its account resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    /// The account ID.
    pub account_id: AccountId,
    /// The account code.
    pub account_code: String,
    /// The account type.
    pub account_type: AccountType,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

/// Entry totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTotals {
    /// Sum of debit amounts.
    pub total_debits: Decimal,
    /// Sum of credit amounts.
    pub total_credits: Decimal,
    /// Whether the entry is balanced (debits == credits).
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates entry totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debits: Decimal, total_credits: Decimal) -> Self {
        Self {
            total_debits,
            total_credits,
            is_balanced: total_debits == total_credits,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debits - self.total_credits
    }
}

/// A persisted journal entry with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// The entry ID.
    pub id: JournalEntryId,
    /// Sequential entry number (`JE-YYYYMM-NNNN`).
    pub entry_number: String,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Kind of originating document.
    pub reference_type: String,
    /// Identifier of the originating document.
    pub reference_id: String,
    /// Posted entries are immutable.
    pub is_posted: bool,
    /// Opaque identity of the creator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// The lines, in input order.
    pub lines: Vec<JournalEntryLine>,
}

impl JournalEntry {
    /// Returns the debit and credit totals of the entry.
    #[must_use]
    pub fn totals(&self) -> EntryTotals {
        let total_debits: Decimal = self.lines.iter().map(|l| l.debit).sum();
        let total_credits: Decimal = self.lines.iter().map(|l| l.credit).sum();
        EntryTotals::new(total_debits, total_credits)
    }
}

/// A persisted journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    /// The line ID.
    pub id: JournalLineId,
    /// The account ID.
    pub account_id: AccountId,
    /// The account code.
    pub account_code: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}
