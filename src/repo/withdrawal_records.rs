use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseTransaction};

use crate::entities::withdrawal_records;

/// Append-only log of withdrawn accounts. There is deliberately no update or delete.
#[async_trait]
pub trait WithdrawalRecordsRepo: Send + Sync {
    async fn insert_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: withdrawal_records::ActiveModel,
    ) -> Result<withdrawal_records::Model, sea_orm::DbErr>;
}

/// Written only inside a withdrawal transaction.
#[derive(Default)]
pub struct SeaOrmWithdrawalRecordsRepo;

#[async_trait]
impl WithdrawalRecordsRepo for SeaOrmWithdrawalRecordsRepo {
    async fn insert_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: withdrawal_records::ActiveModel,
    ) -> Result<withdrawal_records::Model, sea_orm::DbErr> {
        model.insert(txn).await
    }
}
