use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::prelude::*;

mod accounts;
mod comments;
mod withdrawal_records;

/// Idempotently creates every table and index the service needs.
pub async fn apply(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);

    accounts::apply(&manager, conn).await?;
    withdrawal_records::apply(&manager).await?;
    comments::apply(&manager, conn).await?;

    Ok(())
}

async fn execute_raw(conn: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    conn.execute(Statement::from_string(
        conn.get_database_backend(),
        sql.to_string(),
    ))
    .await?;
    Ok(())
}
