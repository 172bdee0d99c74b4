//! Journal repository: the single write path of the ledger.
//!
//! Every entry is validated in full before the first write, then header,
//! lines and cached balances are persisted in one database transaction.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tally_core::ledger::{
    AccountInfo, JournalEntry, JournalEntryLine, LedgerError, LedgerService, RecordEntryInput,
    ResolvedLine, ReversalService, format_entry_number, numbering_period, signed_movement,
};
use tally_shared::types::{AccountId, JournalEntryId, JournalLineId};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{from_cents, read_error, to_cents, write_error};
use crate::entities::sea_orm_active_enums::AccountType;
use crate::entities::{accounts, entry_number_sequences, journal_entries, journal_entry_lines};

/// Default prefix of generated entry numbers.
pub const DEFAULT_ENTRY_NUMBER_PREFIX: &str = "JE";

/// Journal repository for recording and reading entries.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    prefix: String,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            prefix: DEFAULT_ENTRY_NUMBER_PREFIX.to_string(),
        }
    }

    /// Sets the prefix of generated entry numbers.
    #[must_use]
    pub fn with_entry_number_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Records a balanced journal entry.
    ///
    /// Header, lines, the entry number counter and the cached balance of
    /// every affected account commit together or not at all. Inside the
    /// transaction the account rows are written first and the counter last,
    /// so the counter row is held only for the final statements.
    ///
    /// # Errors
    ///
    /// Validation errors in this order, all before any write:
    /// - `InsufficientLines`
    /// - `MalformedLine`
    /// - `UnknownAccount` (first unresolved code)
    /// - `InactiveAccount`
    /// - `ImbalancedEntry`
    /// - `InvalidAmount` if an account balance would leave the cent range
    ///
    /// `InactiveAccount` or `InvalidAmount` again if a concurrent change
    /// invalidates the entry between validation and write.
    /// `TransactionFailure` if an account changed type since validation or
    /// storage fails. Nothing is persisted in any of these cases.
    #[instrument(
        skip(self, input),
        fields(
            reference_type = %input.reference_type,
            reference_id = %input.reference_id,
            lines = input.lines.len()
        )
    )]
    pub async fn record_entry(&self, input: RecordEntryInput) -> Result<JournalEntry, LedgerError> {
        let accounts = load_accounts(&self.db, &input).await?;
        let (resolved, deltas, totals) = LedgerService::validate_and_resolve(&input, |code| {
            accounts.get(code).map(AccountInfo::from)
        })
        .and_then(|(resolved, totals)| {
            let deltas = balance_deltas(&resolved, &accounts)?;
            Ok((resolved, deltas, totals))
        })
        .inspect_err(|e| warn!(error_code = e.error_code(), error = %e, "entry rejected"))?;

        let created_at = Utc::now();
        let entry_id = Uuid::now_v7();
        let txn = self.db.begin().await.map_err(write_error)?;

        apply_balance_deltas(&txn, &deltas).await?;

        let header = journal_entries::ActiveModel {
            id: Set(entry_id),
            // replaced by the real number right before commit
            entry_number: Set(entry_id.simple().to_string()),
            entry_date: Set(input.entry_date),
            description: Set(input.description.clone()),
            reference_type: Set(input.reference_type.clone()),
            reference_id: Set(input.reference_id.clone()),
            is_posted: Set(true),
            created_by: Set(input.created_by.clone()),
            created_at: Set(created_at),
        };
        let mut header = header.insert(&txn).await.map_err(write_error)?;
        let lines = insert_lines(&txn, entry_id, &resolved).await?;

        let entry_number = self.next_entry_number(&txn, &numbering_period(created_at)).await?;
        journal_entries::Entity::update_many()
            .col_expr(
                journal_entries::Column::EntryNumber,
                Expr::value(entry_number.clone()),
            )
            .filter(journal_entries::Column::Id.eq(entry_id))
            .exec(&txn)
            .await
            .map_err(write_error)?;

        txn.commit().await.map_err(write_error)?;
        header.entry_number = entry_number;

        info!(
            entry_number = %header.entry_number,
            total = %totals.total_debits,
            "journal entry recorded"
        );
        Ok(to_journal_entry(header, lines))
    }

    /// Gets a posted entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no entry has the number.
    pub async fn get_entry(&self, entry_number: &str) -> Result<JournalEntry, LedgerError> {
        let header = journal_entries::Entity::find()
            .filter(journal_entries::Column::EntryNumber.eq(entry_number))
            .one(&self.db)
            .await
            .map_err(read_error)?
            .ok_or_else(|| LedgerError::EntryNotFound(entry_number.to_string()))?;

        let mut lines = load_lines(&self.db, &[header.id]).await?;
        let lines = lines.remove(&header.id).unwrap_or_default();
        Ok(to_journal_entry(header, lines))
    }

    /// Finds every entry linked to a business document.
    ///
    /// Ordered by entry date, then entry number. An empty result means the
    /// document was never posted.
    pub async fn find_entries_by_reference(
        &self,
        reference_type: &str,
        reference_id: &str,
    ) -> Result<Vec<JournalEntry>, LedgerError> {
        debug!(reference_type, reference_id, "finding entries by reference");
        let headers = journal_entries::Entity::find()
            .filter(journal_entries::Column::ReferenceType.eq(reference_type))
            .filter(journal_entries::Column::ReferenceId.eq(reference_id))
            .order_by_asc(journal_entries::Column::EntryDate)
            .order_by_asc(journal_entries::Column::EntryNumber)
            .all(&self.db)
            .await
            .map_err(read_error)?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let mut lines = load_lines(&self.db, &ids).await?;

        Ok(headers
            .into_iter()
            .map(|header| {
                let entry_lines = lines.remove(&header.id).unwrap_or_default();
                to_journal_entry(header, entry_lines)
            })
            .collect())
    }

    /// Posts an entry that swaps every debit and credit of `entry_number`.
    ///
    /// The reversal goes through [`JournalRepository::record_entry`] and is
    /// referenced as (`REVERSAL`, original entry number).
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` for an unknown original, otherwise any
    /// `record_entry` error (for example an account deactivated since).
    #[instrument(skip(self, created_by))]
    pub async fn reverse_entry(
        &self,
        entry_number: &str,
        entry_date: NaiveDate,
        created_by: impl Into<String>,
    ) -> Result<JournalEntry, LedgerError> {
        let original = self.get_entry(entry_number).await?;
        let reversal = ReversalService::build_reversal(&original, entry_date, created_by);
        self.record_entry(reversal).await
    }

    /// Bumps the counter of `period` inside `txn` and formats the number.
    ///
    /// The counter row stays locked until the transaction ends.
    async fn next_entry_number(
        &self,
        txn: &DatabaseTransaction,
        period: &str,
    ) -> Result<String, LedgerError> {
        let seed = entry_number_sequences::ActiveModel {
            period: Set(period.to_string()),
            last_value: Set(1),
        };
        entry_number_sequences::Entity::insert(seed)
            .on_conflict(
                OnConflict::column(entry_number_sequences::Column::Period)
                    .value(
                        entry_number_sequences::Column::LastValue,
                        Expr::col((
                            entry_number_sequences::Entity,
                            entry_number_sequences::Column::LastValue,
                        ))
                        .add(1),
                    )
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await
            .map_err(write_error)?;

        let counter = entry_number_sequences::Entity::find_by_id(period.to_string())
            .one(txn)
            .await
            .map_err(write_error)?
            .ok_or_else(|| {
                LedgerError::TransactionFailure(format!("entry number counter {period} missing"))
            })?;

        Ok(format_entry_number(&self.prefix, period, counter.last_value))
    }
}

/// Loads the accounts referenced by `input`, keyed by code.
async fn load_accounts<C>(
    db: &C,
    input: &RecordEntryInput,
) -> Result<HashMap<String, accounts::Model>, LedgerError>
where
    C: ConnectionTrait,
{
    let codes: Vec<&str> = input.lines.iter().map(|l| l.account_code.as_str()).collect();
    let models = accounts::Entity::find()
        .filter(accounts::Column::Code.is_in(codes))
        .all(db)
        .await
        .map_err(read_error)?;

    Ok(models.into_iter().map(|m| (m.code.clone(), m)).collect())
}

/// Net change of one account's cached balance, in cents.
#[derive(Debug)]
struct BalanceDelta {
    code: String,
    account_type: AccountType,
    cents: i64,
}

/// Sums each account's signed movement, ordered by account id so that
/// concurrent writers lock account rows in the same sequence.
fn balance_deltas(
    resolved: &[ResolvedLine],
    accounts: &HashMap<String, accounts::Model>,
) -> Result<BTreeMap<AccountId, BalanceDelta>, LedgerError> {
    let mut deltas: BTreeMap<AccountId, BalanceDelta> = BTreeMap::new();
    for line in resolved {
        let movement = to_cents(signed_movement(line.account_type, line.debit, line.credit))?;
        let delta = deltas
            .entry(line.account_id)
            .or_insert_with(|| BalanceDelta {
                code: line.account_code.clone(),
                account_type: line.account_type.into(),
                cents: 0,
            });
        delta.cents = delta
            .cents
            .checked_add(movement)
            .ok_or_else(|| balance_overflow(&line.account_code))?;
    }

    for delta in deltas.values() {
        let cached = accounts.get(&delta.code).map_or(0, |m| m.current_balance);
        if cached.checked_add(delta.cents).is_none() {
            return Err(balance_overflow(&delta.code));
        }
    }
    Ok(deltas)
}

fn balance_overflow(code: &str) -> LedgerError {
    LedgerError::InvalidAmount(format!("balance of account {code} would overflow"))
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    entry_id: Uuid,
    resolved: &[ResolvedLine],
) -> Result<Vec<JournalEntryLine>, LedgerError> {
    let mut models = Vec::with_capacity(resolved.len());
    let mut lines = Vec::with_capacity(resolved.len());

    for (line_number, line) in (1_i32..).zip(resolved) {
        let id = JournalLineId::new();
        models.push(journal_entry_lines::ActiveModel {
            id: Set(id.into_inner()),
            journal_entry_id: Set(entry_id),
            line_number: Set(line_number),
            account_id: Set(line.account_id.into_inner()),
            debit: Set(to_cents(line.debit)?),
            credit: Set(to_cents(line.credit)?),
            description: Set(line.description.clone()),
        });
        lines.push(JournalEntryLine {
            id,
            account_id: line.account_id,
            account_code: line.account_code.clone(),
            debit: line.debit,
            credit: line.credit,
            description: line.description.clone(),
        });
    }

    journal_entry_lines::Entity::insert_many(models)
        .exec_without_returning(txn)
        .await
        .map_err(write_error)?;

    Ok(lines)
}

/// Adds each account's net signed movement to its cached balance.
///
/// Every affected account is written, zero deltas included. The update only
/// matches a row that is still active, still has the validated type and has
/// room for the delta, so any concurrent change aborts the whole entry.
async fn apply_balance_deltas(
    txn: &DatabaseTransaction,
    deltas: &BTreeMap<AccountId, BalanceDelta>,
) -> Result<(), LedgerError> {
    for (account_id, delta) in deltas {
        let headroom = if delta.cents >= 0 {
            accounts::Column::CurrentBalance.lte(i64::MAX - delta.cents)
        } else {
            accounts::Column::CurrentBalance.gte(i64::MIN - delta.cents)
        };

        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::CurrentBalance,
                Expr::col(accounts::Column::CurrentBalance).add(delta.cents),
            )
            .filter(accounts::Column::Id.eq(account_id.into_inner()))
            .filter(accounts::Column::IsActive.eq(true))
            .filter(accounts::Column::AccountType.eq(delta.account_type))
            .filter(headroom)
            .exec(txn)
            .await
            .map_err(write_error)?;

        if result.rows_affected != 1 {
            let err = posting_conflict(txn, *account_id, delta).await;
            warn!(
                account = %delta.code,
                error_code = err.error_code(),
                "account changed during posting"
            );
            return Err(err);
        }
    }
    Ok(())
}

/// Explains why a balance update matched no row.
async fn posting_conflict(
    txn: &DatabaseTransaction,
    account_id: AccountId,
    delta: &BalanceDelta,
) -> LedgerError {
    match accounts::Entity::find_by_id(account_id.into_inner()).one(txn).await {
        Ok(Some(model)) if !model.is_active => LedgerError::InactiveAccount(delta.code.clone()),
        Ok(Some(model)) if model.account_type != delta.account_type => {
            LedgerError::TransactionFailure(format!(
                "account {} changed type during posting",
                delta.code
            ))
        }
        Ok(Some(_)) => balance_overflow(&delta.code),
        Ok(None) => LedgerError::UnknownAccount(delta.code.clone()),
        Err(e) => write_error(e),
    }
}

/// Loads lines of the given entries with their account codes, in line order.
async fn load_lines<C>(
    db: &C,
    entry_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<JournalEntryLine>>, LedgerError>
where
    C: ConnectionTrait,
{
    if entry_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = journal_entry_lines::Entity::find()
        .find_also_related(accounts::Entity)
        .filter(journal_entry_lines::Column::JournalEntryId.is_in(entry_ids.iter().copied()))
        .order_by_asc(journal_entry_lines::Column::JournalEntryId)
        .order_by_asc(journal_entry_lines::Column::LineNumber)
        .all(db)
        .await
        .map_err(read_error)?;

    let mut lines: HashMap<Uuid, Vec<JournalEntryLine>> = HashMap::new();
    for (line, account) in rows {
        lines
            .entry(line.journal_entry_id)
            .or_default()
            .push(JournalEntryLine {
                id: JournalLineId::from_uuid(line.id),
                account_id: AccountId::from_uuid(line.account_id),
                account_code: account.map(|a| a.code).unwrap_or_default(),
                debit: from_cents(line.debit),
                credit: from_cents(line.credit),
                description: line.description,
            });
    }
    Ok(lines)
}

fn to_journal_entry(header: journal_entries::Model, lines: Vec<JournalEntryLine>) -> JournalEntry {
    JournalEntry {
        id: JournalEntryId::from_uuid(header.id),
        entry_number: header.entry_number,
        entry_date: header.entry_date,
        description: header.description,
        reference_type: header.reference_type,
        reference_id: header.reference_id,
        is_posted: header.is_posted,
        created_by: header.created_by,
        created_at: header.created_at,
        lines,
    }
}
