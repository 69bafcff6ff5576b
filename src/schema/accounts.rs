use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::execute_raw;

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("accounts").await? {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::Email).string().not_null())
                    .col(ColumnDef::new(Accounts::DisplayName).string())
                    .col(ColumnDef::new(Accounts::Nickname).string())
                    .col(ColumnDef::new(Accounts::AvatarUrl).string())
                    .col(ColumnDef::new(Accounts::PasswordHash).string())
                    .col(ColumnDef::new(Accounts::Provider).string())
                    .col(ColumnDef::new(Accounts::ProviderSubject).string())
                    .col(
                        ColumnDef::new(Accounts::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Accounts::DeletedAt).timestamp_with_time_zone())
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
                    .to_owned(),
            )
            .await?;
    }

    // A withdrawn account keeps its email so the address can be registered again.
    execute_raw(
        conn,
        "CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_active_unique \
         ON accounts (email) WHERE deleted = false",
    )
    .await?;

    execute_raw(
        conn,
        "CREATE UNIQUE INDEX IF NOT EXISTS accounts_provider_subject_unique \
         ON accounts (provider, provider_subject) WHERE provider_subject IS NOT NULL",
    )
    .await?;

    execute_raw(
        conn,
        "CREATE INDEX IF NOT EXISTS accounts_email_provider_idx \
         ON accounts (email, provider)",
    )
    .await?;

    Ok(())
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Email,
    DisplayName,
    Nickname,
    AvatarUrl,
    PasswordHash,
    Provider,
    ProviderSubject,
    Deleted,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}
