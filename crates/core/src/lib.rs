//! Core ledger logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping logic
//! - `chart` - Chart of accounts hierarchy rules
//! - `reports` - Trial balance, profit & loss and balance sheet aggregation

pub mod chart;
pub mod ledger;
pub mod reports;
