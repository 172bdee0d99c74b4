//! Database migration runner for Tally.
//!
//! Reads `DATABASE_URL` (a `.env` file is honoured) and applies the ledger
//! schema to PostgreSQL or SQLite.
//!
//! Usage:
//!   migrator up      - Create the ledger tables
//!   migrator down    - Drop the ledger tables
//!   migrator status  - Show which migrations are applied
//!   migrator fresh   - Drop everything and re-create the schema

use sea_orm_migration::prelude::*;
use tally_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // the CLI installs its own tracing subscriber
    cli::run_cli(Migrator).await;
}
