//! Financial report generation.
//!
//! This module provides pure business logic for generating financial reports:
//! - Trial Balance
//! - Profit & Loss
//! - Balance Sheet
//!
//! Storage computes per-account movements with one query and hands the
//! resulting balances to `ReportService`.

pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::*;
