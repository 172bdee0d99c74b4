//! Account repository for chart of accounts database operations.

use std::collections::HashMap;

use chrono::Utc;
use futures::{Stream, StreamExt, TryStreamExt, stream};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tally_core::chart::HierarchyService;
use tally_core::ledger::validation::{validate_account_code, validate_amount};
use tally_core::ledger::{Account, AccountFilter, AccountUpdate, LedgerError, NewAccount};
use tally_shared::types::AccountId;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{DEFAULT_PAGE_SIZE, is_unique_violation, read_error, to_cents, write_error};
use crate::entities::{accounts, journal_entry_lines, sea_orm_active_enums::AccountType};

/// Account repository for the chart of accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    page_size: u64,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the number of rows fetched per round trip by listings.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The code is malformed (`InvalidAccountCode`)
    /// - The opening balance has sub-cent precision (`InvalidAmount`)
    /// - The code already exists (`DuplicateAccount`)
    /// - The parent code does not exist (`InvalidHierarchy`)
    #[instrument(skip(self, input), fields(code = %input.code, account_type = %input.account_type))]
    pub async fn create_account(&self, input: NewAccount) -> Result<Account, LedgerError> {
        validate_account_code(&input.code)?;
        validate_amount(input.opening_balance)?;
        let opening_cents = to_cents(input.opening_balance)?;

        if find_model_by_code(&self.db, &input.code).await?.is_some() {
            return Err(LedgerError::DuplicateAccount(input.code));
        }

        let parent_id = match &input.parent_code {
            Some(parent_code) => Some(resolve_parent(&self.db, parent_code).await?.id),
            None => None,
        };

        let now = Utc::now();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code.clone()),
            name: Set(input.name),
            description: Set(input.description),
            account_type: Set(input.account_type.into()),
            parent_id: Set(parent_id),
            opening_balance: Set(opening_cents),
            current_balance: Set(opening_cents),
            is_active: Set(true),
            is_system_account: Set(input.is_system_account),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = account.insert(&self.db).await.map_err(|e| {
            // lost a race against a concurrent create with the same code
            if is_unique_violation(&e) {
                LedgerError::DuplicateAccount(input.code.clone())
            } else {
                read_error(e)
            }
        })?;

        info!(account_id = %model.id, "account created");
        Ok(model.into())
    }

    /// Gets an account by its code.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if no account has the code.
    pub async fn get_account_by_code(&self, code: &str) -> Result<Account, LedgerError> {
        find_model_by_code(&self.db, code)
            .await?
            .map(Account::from)
            .ok_or_else(|| LedgerError::UnknownAccount(code.to_string()))
    }

    /// Lists accounts ordered by code.
    ///
    /// Nothing is read until the returned cursor is streamed, and every
    /// stream starts again from the first account.
    #[must_use]
    pub fn list_accounts(&self, filter: AccountFilter) -> AccountCursor {
        AccountCursor {
            db: self.db.clone(),
            filter,
            page_size: self.page_size,
        }
    }

    /// Returns the direct children of an account, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the parent code does not exist.
    pub async fn get_children(&self, code: &str) -> Result<Vec<Account>, LedgerError> {
        let parent = self.get_account_by_code(code).await?;
        let children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(parent.id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(read_error)?;

        Ok(children.into_iter().map(Account::from).collect())
    }

    /// Updates an account's name, description, type or parent.
    ///
    /// The first statement writes the account row, so concurrent writers
    /// posting to it wait for this transaction. The type only changes while
    /// no line references the account, checked in the same statement.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist (`UnknownAccount`)
    /// - The type changes while lines reference the account (`AccountTypeLocked`)
    /// - The new parent does not exist or would create a cycle (`InvalidHierarchy`)
    /// - Storage fails (`TransactionFailure`); nothing is changed
    #[instrument(skip(self, update))]
    pub async fn update_account(
        &self,
        code: &str,
        update: AccountUpdate,
    ) -> Result<Account, LedgerError> {
        let txn = self.db.begin().await.map_err(write_error)?;

        let mut touch = accounts::Entity::update_many()
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Code.eq(code));
        if let Some(name) = update.name {
            touch = touch.col_expr(accounts::Column::Name, Expr::value(name));
        }
        if let Some(description) = update.description {
            touch = touch.col_expr(accounts::Column::Description, Expr::value(description));
        }
        let touched = touch.exec(&txn).await.map_err(write_error)?;
        if touched.rows_affected == 0 {
            return Err(LedgerError::UnknownAccount(code.to_string()));
        }

        let model = find_model_by_code(&txn, code)
            .await?
            .ok_or_else(|| LedgerError::UnknownAccount(code.to_string()))?;

        let new_type = update
            .account_type
            .map(AccountType::from)
            .filter(|new_type| *new_type != model.account_type);
        if let Some(new_type) = new_type {
            let referenced = Query::select()
                .expr(Expr::val(1))
                .from(journal_entry_lines::Entity)
                .and_where(
                    Expr::col((
                        journal_entry_lines::Entity,
                        journal_entry_lines::Column::AccountId,
                    ))
                    .eq(model.id),
                )
                .to_owned();
            let result = accounts::Entity::update_many()
                .col_expr(accounts::Column::AccountType, Expr::value(new_type))
                .filter(accounts::Column::Id.eq(model.id))
                .filter(Expr::exists(referenced).not())
                .exec(&txn)
                .await
                .map_err(write_error)?;
            if result.rows_affected == 0 {
                return Err(LedgerError::AccountTypeLocked(code.to_string()));
            }
        }

        if let Some(parent_code) = update.parent_code {
            let parent_id = match parent_code {
                Some(parent_code) => {
                    let parent = resolve_parent(&txn, &parent_code).await?;
                    let links: HashMap<_, _> = parent_links(&txn).await?.into_iter().collect();
                    HierarchyService::ensure_acyclic(
                        Some(AccountId::from_uuid(model.id)),
                        code,
                        AccountId::from_uuid(parent.id),
                        |id| links.get(&id).copied().flatten(),
                    )?;
                    Some(parent.id)
                }
                None => None,
            };
            accounts::Entity::update_many()
                .col_expr(accounts::Column::ParentId, Expr::value(parent_id))
                .filter(accounts::Column::Id.eq(model.id))
                .exec(&txn)
                .await
                .map_err(write_error)?;
        }

        let updated = find_model_by_code(&txn, code)
            .await?
            .ok_or_else(|| LedgerError::UnknownAccount(code.to_string()))?;
        txn.commit().await.map_err(write_error)?;

        info!("account updated");
        Ok(updated.into())
    }

    /// Deactivates an account so it no longer accepts postings.
    ///
    /// Accounts are never deleted once referenced; deactivation is the end of
    /// their life. The balance must be zero so that the trial balance keeps
    /// summing to zero once the account stops showing up in it.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount`, `SystemAccount` or `NonZeroBalance`.
    #[instrument(skip(self))]
    pub async fn deactivate_account(&self, code: &str) -> Result<Account, LedgerError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::IsActive, Expr::value(false))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Code.eq(code))
            .filter(accounts::Column::IsSystemAccount.eq(false))
            .filter(accounts::Column::CurrentBalance.eq(0_i64))
            .exec(&self.db)
            .await
            .map_err(read_error)?;

        let account = self.get_account_by_code(code).await?;
        if result.rows_affected == 0 {
            if account.is_system_account {
                return Err(LedgerError::SystemAccount(code.to_string()));
            }
            if !account.current_balance.is_zero() {
                return Err(LedgerError::NonZeroBalance {
                    code: code.to_string(),
                    balance: account.current_balance,
                });
            }
        }

        info!("account deactivated");
        Ok(account)
    }

    /// Reactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the code does not exist.
    #[instrument(skip(self))]
    pub async fn reactivate_account(&self, code: &str) -> Result<Account, LedgerError> {
        accounts::Entity::update_many()
            .col_expr(accounts::Column::IsActive, Expr::value(true))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Code.eq(code))
            .exec(&self.db)
            .await
            .map_err(read_error)?;

        let account = self.get_account_by_code(code).await?;
        info!("account reactivated");
        Ok(account)
    }
}

/// Lazy, restartable listing of accounts.
///
/// Each call to [`AccountCursor::stream`] issues fresh paged queries, so a
/// cursor can be consumed any number of times.
#[derive(Debug, Clone)]
pub struct AccountCursor {
    db: DatabaseConnection,
    filter: AccountFilter,
    page_size: u64,
}

impl AccountCursor {
    fn query(&self) -> Select<accounts::Entity> {
        let mut query = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .order_by_asc(accounts::Column::Id);

        if let Some(account_type) = self.filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(AccountType::from(account_type)));
        }
        if let Some(is_active) = self.filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }
        query
    }

    /// Streams the matching accounts page by page.
    pub fn stream(&self) -> impl Stream<Item = Result<Account, LedgerError>> + '_ {
        debug!(page_size = self.page_size, "listing accounts");
        self.query()
            .paginate(&self.db, self.page_size)
            .into_stream()
            .map_err(read_error)
            .map_ok(|page| {
                stream::iter(
                    page.into_iter()
                        .map(|m| Ok::<_, LedgerError>(Account::from(m))),
                )
            })
            .try_flatten()
    }

    /// Collects every matching account.
    ///
    /// # Errors
    ///
    /// Returns `Database` if a page cannot be read.
    pub async fn all(&self) -> Result<Vec<Account>, LedgerError> {
        self.stream().try_collect().await
    }

    /// Counts the matching accounts without loading them.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the count cannot be read.
    pub async fn count(&self) -> Result<u64, LedgerError> {
        self.query().count(&self.db).await.map_err(read_error)
    }

    /// Streams the first `n` matching accounts.
    pub fn take(&self, n: usize) -> impl Stream<Item = Result<Account, LedgerError>> + '_ {
        self.stream().take(n)
    }
}

pub(crate) async fn find_model_by_code<C>(
    db: &C,
    code: &str,
) -> Result<Option<accounts::Model>, LedgerError>
where
    C: ConnectionTrait,
{
    accounts::Entity::find()
        .filter(accounts::Column::Code.eq(code))
        .one(db)
        .await
        .map_err(read_error)
}

async fn resolve_parent<C>(db: &C, parent_code: &str) -> Result<accounts::Model, LedgerError>
where
    C: ConnectionTrait,
{
    find_model_by_code(db, parent_code).await?.ok_or_else(|| {
        LedgerError::InvalidHierarchy(format!("parent account {parent_code} does not exist"))
    })
}

/// Loads `(account, parent)` links for the whole chart.
pub(crate) async fn parent_links<C>(
    db: &C,
) -> Result<Vec<(AccountId, Option<AccountId>)>, LedgerError>
where
    C: ConnectionTrait,
{
    let rows: Vec<(Uuid, Option<Uuid>)> = accounts::Entity::find()
        .select_only()
        .column(accounts::Column::Id)
        .column(accounts::Column::ParentId)
        .into_tuple()
        .all(db)
        .await
        .map_err(read_error)?;

    Ok(rows
        .into_iter()
        .map(|(id, parent)| (AccountId::from_uuid(id), parent.map(AccountId::from_uuid)))
        .collect())
}

