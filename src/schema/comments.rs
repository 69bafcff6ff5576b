use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::execute_raw;

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("comments").await? {
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Comments::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Comments::RegionCode).string().not_null())
                    .col(ColumnDef::new(Comments::Content).string().not_null())
                    .col(
                        ColumnDef::new(Comments::VisibleToUser)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Comments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
    }

    execute_raw(
        conn,
        "CREATE INDEX IF NOT EXISTS comments_region_created_idx \
         ON comments (region_code, created_at)",
    )
    .await?;

    execute_raw(
        conn,
        "CREATE INDEX IF NOT EXISTS comments_account_idx ON comments (account_id)",
    )
    .await?;

    Ok(())
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    AccountId,
    RegionCode,
    Content,
    VisibleToUser,
    CreatedAt,
}
