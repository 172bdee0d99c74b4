//! Journal entry numbering.
//!
//! Entry numbers look like `JE-202601-0001`: a configurable prefix, the
//! numbering period (UTC year and month of creation) and a counter that
//! storage increments atomically per period. The counter is zero-padded
//! to four digits and widens past 9999.

use chrono::{DateTime, Datelike, Utc};

/// Returns the numbering period (`YYYYMM`) for a creation timestamp.
#[must_use]
pub fn numbering_period(created_at: DateTime<Utc>) -> String {
    format!("{:04}{:02}", created_at.year(), created_at.month())
}

/// Formats an entry number from its parts.
#[must_use]
pub fn format_entry_number(prefix: &str, period: &str, counter: i64) -> String {
    format!("{prefix}-{period}-{counter:04}")
}

/// Splits an entry number into prefix, period and counter.
#[must_use]
pub fn parse_entry_number(entry_number: &str) -> Option<(&str, &str, i64)> {
    let mut parts = entry_number.rsplitn(3, '-');
    let counter = parts.next()?.parse().ok()?;
    let period = parts.next()?;
    let prefix = parts.next()?;
    if period.len() != 6 || !period.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((prefix, period, counter))
}
