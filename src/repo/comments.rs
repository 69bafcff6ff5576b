use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::{
    entities::{accounts, comments},
    state::DatabaseClient,
};

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn insert(&self, model: comments::ActiveModel) -> Result<comments::Model, sea_orm::DbErr>;
    /// Visible comments of a region, newest first, paired with their author.
    async fn list_visible_by_region(
        &self,
        region_code: &str,
    ) -> Result<Vec<(comments::Model, Option<accounts::Model>)>, sea_orm::DbErr>;
    async fn count_visible_by_account(&self, account_id: Uuid) -> Result<u64, sea_orm::DbErr>;
    async fn hide_all_by_account(&self, account_id: Uuid) -> Result<u64, sea_orm::DbErr>;
}

pub struct SeaOrmCommentsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmCommentsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentsRepo for SeaOrmCommentsRepo {
    async fn insert(&self, model: comments::ActiveModel) -> Result<comments::Model, sea_orm::DbErr> {
        model.insert(self.db.conn()).await
    }

    async fn list_visible_by_region(
        &self,
        region_code: &str,
    ) -> Result<Vec<(comments::Model, Option<accounts::Model>)>, sea_orm::DbErr> {
        let rows = comments::Entity::find()
            .filter(comments::Column::RegionCode.eq(region_code))
            .filter(comments::Column::VisibleToUser.eq(true))
            .order_by_desc(comments::Column::CreatedAt)
            .all(self.db.conn())
            .await?;

        let mut author_ids: Vec<Uuid> = rows.iter().map(|row| row.account_id).collect();
        author_ids.sort();
        author_ids.dedup();
        let authors = if author_ids.is_empty() {
            Vec::new()
        } else {
            accounts::Entity::find()
                .filter(accounts::Column::Id.is_in(author_ids))
                .all(self.db.conn())
                .await?
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let author = authors
                    .iter()
                    .find(|account| account.id == row.account_id)
                    .cloned();
                (row, author)
            })
            .collect())
    }

    async fn count_visible_by_account(&self, account_id: Uuid) -> Result<u64, sea_orm::DbErr> {
        comments::Entity::find()
            .filter(comments::Column::AccountId.eq(account_id))
            .filter(comments::Column::VisibleToUser.eq(true))
            .count(self.db.conn())
            .await
    }

    async fn hide_all_by_account(&self, account_id: Uuid) -> Result<u64, sea_orm::DbErr> {
        let result = comments::Entity::update_many()
            .col_expr(comments::Column::VisibleToUser, Expr::value(false))
            .filter(comments::Column::AccountId.eq(account_id))
            .exec(self.db.conn())
            .await?;
        Ok(result.rows_affected)
    }
}
