//! Balance calculator over the line history.
//!
//! Balances are recomputed from opening balances plus posted lines; the
//! cached `current_balance` column is only a shortcut for the writer.

use chrono::NaiveDate;
use futures::{Stream, StreamExt, TryStreamExt, stream};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
    SelectTwo,
};
use tally_core::chart::{HierarchyService, RollupBalance};
use tally_core::ledger::validation::validate_date_range;
use tally_core::ledger::{Account, AccountBalance, LedgerError, Movement};
use tally_core::reports::LedgerDetailLine;
use tracing::debug;
use uuid::Uuid;

use super::account::{find_model_by_code, parent_links};
use super::movement::{DateWindow, account_movements};
use super::{DEFAULT_PAGE_SIZE, from_cents, read_error};
use crate::entities::{accounts, journal_entries, journal_entry_lines};

/// Balance repository.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
    page_size: u64,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the number of rows fetched per round trip by ledger detail.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Balance of an account: opening balance plus the signed sum of posted
    /// lines dated on or before `as_of` (all lines when `None`).
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the code does not exist.
    pub async fn get_account_balance(
        &self,
        code: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountBalance, LedgerError> {
        let account = self.account(code).await?;
        debug!(code, ?as_of, "computing account balance");

        let movement = account_movements(&self.db, DateWindow::as_of(as_of), Some(&[account.id]))
            .await
            .map_err(read_error)?
            .remove(&account.id)
            .unwrap_or_default();

        Ok(AccountBalance::with_opening(&account, movement))
    }

    /// Lines posted to an account between `start` and `end`, inclusive.
    ///
    /// Nothing is read until the returned sequence is streamed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`, `UnknownAccount` if the
    /// code does not exist.
    pub async fn get_ledger_detail(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<LedgerDetail, LedgerError> {
        validate_date_range(start, end)?;
        let account = self.account(code).await?;

        Ok(LedgerDetail {
            db: self.db.clone(),
            account_id: account.id.into_inner(),
            window: DateWindow::between(start, end),
            page_size: self.page_size,
        })
    }

    /// Balance of an account plus all of its descendants, each converted to
    /// the account's natural direction.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the code does not exist.
    pub async fn get_rollup_balance(
        &self,
        code: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<RollupBalance, LedgerError> {
        let root = self.account(code).await?;
        let links = parent_links(&self.db).await?;
        let descendant_ids = HierarchyService::descendants(root.id, &links);

        let mut ids = Vec::with_capacity(descendant_ids.len() + 1);
        ids.push(root.id);
        ids.extend(descendant_ids.iter().copied());

        let mut movements = account_movements(&self.db, DateWindow::as_of(as_of), Some(&ids))
            .await
            .map_err(read_error)?;

        let descendants = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(descendant_ids.iter().map(|id| id.into_inner())))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(read_error)?
            .into_iter()
            .map(Account::from)
            .map(|account| {
                let movement = movements.remove(&account.id).unwrap_or_default();
                AccountBalance::with_opening(&account, movement)
            })
            .collect::<Vec<_>>();

        let own = AccountBalance::with_opening(
            &root,
            movements.remove(&root.id).unwrap_or_default(),
        );
        Ok(HierarchyService::rollup(&own, &descendants))
    }

    async fn account(&self, code: &str) -> Result<Account, LedgerError> {
        find_model_by_code(&self.db, code)
            .await?
            .map(Account::from)
            .ok_or_else(|| LedgerError::UnknownAccount(code.to_string()))
    }
}

/// Lazy, restartable sequence of ledger lines for one account.
///
/// Ordered by entry date, entry number, then line position. Every call to
/// [`LedgerDetail::stream`] queries again from the first line.
#[derive(Debug, Clone)]
pub struct LedgerDetail {
    db: DatabaseConnection,
    account_id: Uuid,
    window: DateWindow,
    page_size: u64,
}

impl LedgerDetail {
    fn query(&self) -> SelectTwo<journal_entry_lines::Entity, journal_entries::Entity> {
        let lines: Select<journal_entry_lines::Entity> = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::AccountId.eq(self.account_id));

        let mut query = lines
            .find_also_related(journal_entries::Entity)
            .filter(journal_entries::Column::IsPosted.eq(true));
        if let Some(start) = self.window.start {
            query = query.filter(journal_entries::Column::EntryDate.gte(start));
        }
        if let Some(end) = self.window.end {
            query = query.filter(journal_entries::Column::EntryDate.lte(end));
        }

        query
            .order_by_asc(journal_entries::Column::EntryDate)
            .order_by_asc(journal_entries::Column::EntryNumber)
            .order_by_asc(journal_entry_lines::Column::LineNumber)
    }

    /// Streams the lines page by page.
    pub fn stream(&self) -> impl Stream<Item = Result<LedgerDetailLine, LedgerError>> + '_ {
        self.query()
            .paginate(&self.db, self.page_size)
            .into_stream()
            .map_err(read_error)
            .map_ok(|page| {
                stream::iter(
                    page.into_iter()
                        .filter_map(detail_line)
                        .map(Ok::<_, LedgerError>),
                )
            })
            .try_flatten()
    }

    /// Collects every line.
    ///
    /// # Errors
    ///
    /// Returns `Database` if a page cannot be read.
    pub async fn all(&self) -> Result<Vec<LedgerDetailLine>, LedgerError> {
        self.stream().try_collect().await
    }

    /// Total debits and credits over the window.
    ///
    /// # Errors
    ///
    /// Returns `Database` if a page cannot be read.
    pub async fn movement(&self) -> Result<Movement, LedgerError> {
        self.stream()
            .try_fold(Movement::default(), |mut movement, line| async move {
                movement.add_line(line.debit, line.credit);
                Ok(movement)
            })
            .await
    }

    /// Streams the first `n` lines.
    pub fn take(&self, n: usize) -> impl Stream<Item = Result<LedgerDetailLine, LedgerError>> + '_ {
        self.stream().take(n)
    }
}

fn detail_line(
    (line, entry): (journal_entry_lines::Model, Option<journal_entries::Model>),
) -> Option<LedgerDetailLine> {
    // the inner filter on entry columns guarantees a header
    let entry = entry?;
    Some(LedgerDetailLine {
        entry_date: entry.entry_date,
        entry_number: entry.entry_number,
        description: line.description.unwrap_or(entry.description),
        debit: from_cents(line.debit),
        credit: from_cents(line.credit),
        reference_type: entry.reference_type,
        reference_id: entry.reference_id,
    })
}
