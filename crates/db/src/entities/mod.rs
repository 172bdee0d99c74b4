//! `SeaORM` entity definitions.

pub mod accounts;
pub mod entry_number_sequences;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod sea_orm_active_enums;
