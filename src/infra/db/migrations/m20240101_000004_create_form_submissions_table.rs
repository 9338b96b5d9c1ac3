//! Migration: Create form submission log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FormSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FormSubmissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FormSubmissions::Ip).string_len(64).not_null())
                    .col(ColumnDef::new(FormSubmissions::UserAgent).text().null())
                    .col(ColumnDef::new(FormSubmissions::Fingerprint).string().null())
                    .col(ColumnDef::new(FormSubmissions::Form).string_len(64).not_null())
                    .col(
                        ColumnDef::new(FormSubmissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookups by caller over a recent time range
        manager
            .create_index(
                Index::create()
                    .name("idx_form_submissions_ip_created_at")
                    .table(FormSubmissions::Table)
                    .col(FormSubmissions::Ip)
                    .col(FormSubmissions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FormSubmissions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FormSubmissions {
    Table,
    Id,
    Ip,
    UserAgent,
    Fingerprint,
    Form,
    CreatedAt,
}
