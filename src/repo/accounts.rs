use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::{entities::accounts, state::DatabaseClient};

#[async_trait]
pub trait AccountsRepo: Send + Sync {
    async fn insert(&self, model: accounts::ActiveModel) -> Result<accounts::Model, sea_orm::DbErr>;
    async fn update(&self, model: accounts::ActiveModel) -> Result<accounts::Model, sea_orm::DbErr>;
    async fn update_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: accounts::ActiveModel,
    ) -> Result<accounts::Model, sea_orm::DbErr>;
    async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr>;
    async fn find_active_by_email_with_txn(
        &self,
        txn: &DatabaseTransaction,
        email: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr>;
    /// Active row if there is one, otherwise the most recently withdrawn row.
    async fn find_latest_by_email(
        &self,
        email: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr>;
    async fn find_by_provider_subject(
        &self,
        provider: &str,
        provider_subject: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr>;
    async fn find_by_email_and_provider(
        &self,
        email: &str,
        provider: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, sea_orm::DbErr>;
}

pub struct SeaOrmAccountsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmAccountsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    async fn active_by_email<C: ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .filter(accounts::Column::Deleted.eq(false))
            .one(conn)
            .await
    }
}

#[async_trait]
impl AccountsRepo for SeaOrmAccountsRepo {
    async fn insert(&self, model: accounts::ActiveModel) -> Result<accounts::Model, sea_orm::DbErr> {
        model.insert(self.db.conn()).await
    }

    async fn update(&self, model: accounts::ActiveModel) -> Result<accounts::Model, sea_orm::DbErr> {
        model.update(self.db.conn()).await
    }

    async fn update_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: accounts::ActiveModel,
    ) -> Result<accounts::Model, sea_orm::DbErr> {
        model.update(txn).await
    }

    async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
        Self::active_by_email(self.db.conn(), email).await
    }

    async fn find_active_by_email_with_txn(
        &self,
        txn: &DatabaseTransaction,
        email: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
        Self::active_by_email(txn, email).await
    }

    async fn find_latest_by_email(
        &self,
        email: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .order_by_asc(accounts::Column::Deleted)
            .order_by_desc(accounts::Column::DeletedAt)
            .one(self.db.conn())
            .await
    }

    async fn find_by_provider_subject(
        &self,
        provider: &str,
        provider_subject: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::Provider.eq(provider))
            .filter(accounts::Column::ProviderSubject.eq(provider_subject))
            .one(self.db.conn())
            .await
    }

    async fn find_by_email_and_provider(
        &self,
        email: &str,
        provider: &str,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .filter(accounts::Column::Provider.eq(provider))
            .order_by_asc(accounts::Column::Deleted)
            .order_by_desc(accounts::Column::DeletedAt)
            .one(self.db.conn())
            .await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, sea_orm::DbErr> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .filter(accounts::Column::Deleted.eq(false))
            .count(self.db.conn())
            .await?;
        Ok(count > 0)
    }
}
