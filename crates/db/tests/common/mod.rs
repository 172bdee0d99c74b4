//! Shared setup for database integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use tally_core::ledger::{AccountType, EntryLineInput, NewAccount, RecordEntryInput};
use tally_db::Ledger;
use tally_db::entities::{journal_entries, journal_entry_lines};
use tally_db::migration::{Migrator, MigratorTrait};
use tally_shared::config::LedgerConfig;

/// Fresh in-memory database with the schema applied.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None).await.expect("migration failed");
    db
}

/// Ledger with default configuration over a fresh database.
pub async fn setup_ledger() -> (Ledger, DatabaseConnection) {
    let db = setup_db().await;
    (Ledger::new(db.clone(), &LedgerConfig::default()), db)
}

/// SQLite file removed when dropped.
pub struct TempDatabase {
    path: PathBuf,
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Ledger over a fresh SQLite file shared by `max_connections` pooled
/// connections, so transactions really run side by side.
pub async fn setup_file_ledger(
    max_connections: u32,
) -> (Ledger, DatabaseConnection, TempDatabase) {
    let path = std::env::temp_dir().join(format!("tally-{}.db", uuid::Uuid::now_v7()));
    let file = TempDatabase { path };

    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", file.path.display()));
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("failed to open database file");
    Migrator::up(&db, None).await.expect("migration failed");
    (Ledger::new(db.clone(), &LedgerConfig::default()), db, file)
}

/// Creates each `(code, type)` with a zero opening balance.
pub async fn create_accounts(ledger: &Ledger, accounts: &[(&str, AccountType)]) {
    for (code, account_type) in accounts {
        ledger
            .accounts
            .create_account(NewAccount::new(*code, format!("{code} account"), *account_type))
            .await
            .expect("failed to create account");
    }
}

/// Small retail chart used across tests.
pub async fn create_retail_chart(ledger: &Ledger) {
    create_accounts(
        ledger,
        &[
            ("CASH", AccountType::Asset),
            ("AR", AccountType::Asset),
            ("INVENTORY", AccountType::Asset),
            ("AP", AccountType::Liability),
            ("CAPITAL", AccountType::Equity),
            ("SALES", AccountType::Revenue),
            ("COGS", AccountType::Expense),
            ("RENT", AccountType::Expense),
        ],
    )
    .await;
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Two-line entry moving `amount` from `credit` to `debit`.
pub fn simple_entry(
    entry_date: NaiveDate,
    debit: &str,
    credit: &str,
    amount: Decimal,
) -> RecordEntryInput {
    RecordEntryInput {
        entry_date,
        reference_type: "TEST".to_string(),
        reference_id: format!("{debit}-{credit}-{amount}"),
        description: format!("{debit} / {credit}"),
        lines: vec![
            EntryLineInput::debit(debit, amount),
            EntryLineInput::credit(credit, amount),
        ],
        created_by: "tester".to_string(),
    }
}

pub async fn entry_count(db: &DatabaseConnection) -> u64 {
    journal_entries::Entity::find().count(db).await.expect("count entries")
}

pub async fn line_count(db: &DatabaseConnection) -> u64 {
    journal_entry_lines::Entity::find().count(db).await.expect("count lines")
}
