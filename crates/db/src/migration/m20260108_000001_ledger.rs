//! Ledger schema: chart of accounts, journal entries and lines, entry number counters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Accounts::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Accounts::Description).text().null())
                    .col(ColumnDef::new(Accounts::AccountType).string_len(16).not_null())
                    .col(ColumnDef::new(Accounts::ParentId).uuid().null())
                    .col(
                        ColumnDef::new(Accounts::OpeningBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::CurrentBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Accounts::IsSystemAccount)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_parent")
                            .from(Accounts::Table, Accounts::ParentId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_parent")
                    .table(Accounts::Table)
                    .col(Accounts::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JournalEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JournalEntries::EntryNumber)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(JournalEntries::EntryDate).date().not_null())
                    .col(ColumnDef::new(JournalEntries::Description).text().not_null())
                    .col(
                        ColumnDef::new(JournalEntries::ReferenceType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JournalEntries::ReferenceId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JournalEntries::IsPosted)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(JournalEntries::CreatedBy)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JournalEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_entries_date")
                    .table(JournalEntries::Table)
                    .col(JournalEntries::EntryDate)
                    .col(JournalEntries::EntryNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_entries_reference")
                    .table(JournalEntries::Table)
                    .col(JournalEntries::ReferenceType)
                    .col(JournalEntries::ReferenceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalEntryLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JournalEntryLines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JournalEntryLines::JournalEntryId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JournalEntryLines::LineNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JournalEntryLines::AccountId).uuid().not_null())
                    .col(
                        ColumnDef::new(JournalEntryLines::Debit)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(JournalEntryLines::Debit).gte(0)),
                    )
                    .col(
                        ColumnDef::new(JournalEntryLines::Credit)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(JournalEntryLines::Credit).gte(0)),
                    )
                    .col(ColumnDef::new(JournalEntryLines::Description).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_entry_lines_entry")
                            .from(JournalEntryLines::Table, JournalEntryLines::JournalEntryId)
                            .to(JournalEntries::Table, JournalEntries::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_entry_lines_account")
                            .from(JournalEntryLines::Table, JournalEntryLines::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_entry_lines_account")
                    .table(JournalEntryLines::Table)
                    .col(JournalEntryLines::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_entry_lines_entry")
                    .table(JournalEntryLines::Table)
                    .col(JournalEntryLines::JournalEntryId)
                    .col(JournalEntryLines::LineNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EntryNumberSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntryNumberSequences::Period)
                            .string_len(6)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EntryNumberSequences::LastValue)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntryNumberSequences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalEntryLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Code,
    Name,
    Description,
    AccountType,
    ParentId,
    OpeningBalance,
    CurrentBalance,
    IsActive,
    IsSystemAccount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JournalEntries {
    Table,
    Id,
    EntryNumber,
    EntryDate,
    Description,
    ReferenceType,
    ReferenceId,
    IsPosted,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum JournalEntryLines {
    Table,
    Id,
    JournalEntryId,
    LineNumber,
    AccountId,
    Debit,
    Credit,
    Description,
}

#[derive(DeriveIden)]
enum EntryNumberSequences {
    Table,
    Period,
    LastValue,
}
