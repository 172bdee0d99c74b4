//! Database seeder for Tally development and testing.
//!
//! Creates a small retail chart of accounts, posts a month of demo entries
//! and prints the resulting reports as JSON. Safe to run repeatedly: existing
//! accounts are kept and entries are deduplicated by their reference.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;
use tally_core::ledger::{AccountType, EntryLineInput, LedgerError, NewAccount, RecordEntryInput};
use tally_db::Ledger;
use tally_db::migration::Migrator;
use tally_shared::AppConfig;
use tally_shared::config::LoggingConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Reference type of every seeded entry.
const SEED_REFERENCE_TYPE: &str = "SEED";
/// Actor recorded on seeded entries.
const SEED_ACTOR: &str = "seeder";

/// `(code, name, type, parent)`; parents come before their children.
const RETAIL_CHART: &[(&str, &str, AccountType, Option<&str>)] = &[
    ("1000", "Assets", AccountType::Asset, None),
    ("1100", "Cash", AccountType::Asset, Some("1000")),
    ("1110", "Petty cash", AccountType::Asset, Some("1100")),
    ("1200", "Accounts receivable", AccountType::Asset, Some("1000")),
    ("1300", "Inventory", AccountType::Asset, Some("1000")),
    ("2000", "Liabilities", AccountType::Liability, None),
    ("2100", "Accounts payable", AccountType::Liability, Some("2000")),
    ("2200", "Sales tax payable", AccountType::Liability, Some("2000")),
    ("3000", "Equity", AccountType::Equity, None),
    ("3100", "Owner capital", AccountType::Equity, Some("3000")),
    ("4000", "Revenue", AccountType::Revenue, None),
    ("4100", "Store sales", AccountType::Revenue, Some("4000")),
    ("5000", "Expenses", AccountType::Expense, None),
    ("5100", "Cost of goods sold", AccountType::Expense, Some("5000")),
    ("5200", "Rent", AccountType::Expense, Some("5000")),
    ("5300", "Wages", AccountType::Expense, Some("5000")),
];

/// Top-level headings; the chart hangs off them, so they are never deactivated.
const SYSTEM_ACCOUNTS: &[&str] = &["1000", "2000", "3000", "4000", "5000"];

/// One demo posting: `(reference id, day of January 2026, description, lines)`.
type DemoEntry = (&'static str, u32, &'static str, &'static [(&'static str, Decimal, Decimal)]);

const DEMO_ENTRIES: &[DemoEntry] = &[
    (
        "CAP-1",
        2,
        "Owner investment",
        &[("1100", dec!(25000), Decimal::ZERO), ("3100", Decimal::ZERO, dec!(25000))],
    ),
    (
        "PO-1",
        3,
        "Opening stock on credit",
        &[("1300", dec!(8000), Decimal::ZERO), ("2100", Decimal::ZERO, dec!(8000))],
    ),
    (
        "POS-1",
        10,
        "Register takings with sales tax",
        &[
            ("1100", dec!(3240), Decimal::ZERO),
            ("4100", Decimal::ZERO, dec!(3000)),
            ("2200", Decimal::ZERO, dec!(240)),
        ],
    ),
    (
        "POS-1-COST",
        10,
        "Cost of register takings",
        &[("5100", dec!(1450.75), Decimal::ZERO), ("1300", Decimal::ZERO, dec!(1450.75))],
    ),
    (
        "INV-1",
        15,
        "Wholesale order on account",
        &[("1200", dec!(1200), Decimal::ZERO), ("4100", Decimal::ZERO, dec!(1200))],
    ),
    (
        "PETTY-1",
        16,
        "Petty cash float",
        &[("1110", dec!(200), Decimal::ZERO), ("1100", Decimal::ZERO, dec!(200))],
    ),
    (
        "RENT-JAN",
        31,
        "January rent",
        &[("5200", dec!(2000), Decimal::ZERO), ("1100", Decimal::ZERO, dec!(2000))],
    ),
    (
        "PAYROLL-JAN",
        31,
        "January wages",
        &[("5300", dec!(3100.50), Decimal::ZERO), ("1100", Decimal::ZERO, dec!(3100.50))],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let db = tally_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None).await.context("failed to run migrations")?;
    info!("database ready");

    let ledger = Ledger::new(db, &config.ledger);
    seed_chart(&ledger).await?;
    seed_entries(&ledger).await?;

    let month_start = january(1)?;
    let month_end = january(31)?;
    let trial_balance = ledger.reports.get_trial_balance(month_end).await?;
    let profit_and_loss = ledger.reports.get_profit_and_loss(month_start, month_end).await?;
    let balance_sheet = ledger.reports.get_balance_sheet(month_end).await?;
    let cash = ledger.balances.get_rollup_balance("1100", Some(month_end)).await?;

    let summary = serde_json::json!({
        "trial_balance": trial_balance,
        "profit_and_loss": profit_and_loss,
        "balance_sheet": balance_sheet,
        "cash_rollup": cash,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!(
        trial_balance_ok = trial_balance.totals.is_balanced,
        balance_sheet_ok = balance_sheet.is_balanced,
        "seeding complete"
    );
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn january(day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2026, 1, day).with_context(|| format!("invalid day {day}"))
}

/// Creates every chart account that does not exist yet.
async fn seed_chart(ledger: &Ledger) -> anyhow::Result<()> {
    for &(code, name, account_type, parent) in RETAIL_CHART {
        let mut account = NewAccount::new(code, name, account_type);
        if let Some(parent) = parent {
            account = account.with_parent(parent);
        }
        if SYSTEM_ACCOUNTS.contains(&code) {
            account = account.system();
        }

        match ledger.accounts.create_account(account).await {
            Ok(created) => info!(code = %created.code, "account created"),
            Err(LedgerError::DuplicateAccount(_)) => info!(code, "account exists, skipping"),
            Err(e) => return Err(e).with_context(|| format!("failed to create account {code}")),
        }
    }
    Ok(())
}

/// Posts every demo entry whose reference has not been posted before.
async fn seed_entries(ledger: &Ledger) -> anyhow::Result<()> {
    for &(reference_id, day, description, lines) in DEMO_ENTRIES {
        let existing = ledger
            .journal
            .find_entries_by_reference(SEED_REFERENCE_TYPE, reference_id)
            .await?;
        if !existing.is_empty() {
            info!(reference_id, "entry already posted, skipping");
            continue;
        }

        let input = RecordEntryInput {
            entry_date: january(day)?,
            reference_type: SEED_REFERENCE_TYPE.to_string(),
            reference_id: reference_id.to_string(),
            description: description.to_string(),
            lines: lines
                .iter()
                .map(|&(code, debit, credit)| EntryLineInput {
                    account_code: code.to_string(),
                    debit,
                    credit,
                    description: None,
                })
                .collect(),
            created_by: SEED_ACTOR.to_string(),
        };

        let entry = ledger
            .journal
            .record_entry(input)
            .await
            .with_context(|| format!("failed to post {reference_id}"))?;
        info!(entry_number = %entry.entry_number, reference_id, "entry posted");
    }
    Ok(())
}
