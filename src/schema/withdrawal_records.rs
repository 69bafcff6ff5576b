use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    if !manager.has_table("withdrawal_records").await? {
        manager
            .create_table(
                Table::create()
                    .table(WithdrawalRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WithdrawalRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WithdrawalRecords::AccountId).uuid().not_null())
                    .col(ColumnDef::new(WithdrawalRecords::Email).string().not_null())
                    .col(ColumnDef::new(WithdrawalRecords::DisplayName).string())
                    .col(ColumnDef::new(WithdrawalRecords::Nickname).string())
                    .col(ColumnDef::new(WithdrawalRecords::AvatarUrl).string())
                    .col(ColumnDef::new(WithdrawalRecords::Provider).string())
                    .col(ColumnDef::new(WithdrawalRecords::ProviderSubject).string())
                    .col(
                        ColumnDef::new(WithdrawalRecords::WithdrawnAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum WithdrawalRecords {
    Table,
    Id,
    AccountId,
    Email,
    DisplayName,
    Nickname,
    AvatarUrl,
    Provider,
    ProviderSubject,
    WithdrawnAt,
}
