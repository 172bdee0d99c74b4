//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Amounts are stored as whole cents (`BIGINT`) and converted to
//! `rust_decimal::Decimal` at the repository boundary.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountCursor, AccountRepository, BalanceRepository, DateWindow, JournalRepository,
    LedgerDetail, ReportRepository,
};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::config::{DatabaseConfig, LedgerConfig};

/// Establishes a connection pool from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(config.sqlx_logging);

    Database::connect(options).await
}

/// Every ledger component over one connection pool.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Chart of accounts registry.
    pub accounts: AccountRepository,
    /// Journal entry writer.
    pub journal: JournalRepository,
    /// Balance calculator.
    pub balances: BalanceRepository,
    /// Report generator.
    pub reports: ReportRepository,
}

impl Ledger {
    /// Builds all repositories over `db`.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()).with_page_size(config.page_size),
            journal: JournalRepository::new(db.clone())
                .with_entry_number_prefix(config.entry_number_prefix.clone()),
            balances: BalanceRepository::new(db.clone()).with_page_size(config.page_size),
            reports: ReportRepository::new(db),
        }
    }
}
