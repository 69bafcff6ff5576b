use async_trait::async_trait;
use chrono::Utc;
use sea_orm::Set;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::{accounts, comments},
    error::{ServiceError, ServiceResult},
    repo::comments::CommentsRepo,
    service::regions::RegionDirectory,
};

pub const COMMENT_MAX_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: comments::Model,
    pub author_nickname: Option<String>,
}

#[async_trait]
pub trait CommentsService: Send + Sync {
    async fn post(
        &self,
        author: &accounts::Model,
        region_code: &str,
        content: &str,
    ) -> ServiceResult<CommentView>;
    async fn list_by_region(&self, region_code: &str) -> ServiceResult<Vec<CommentView>>;
    async fn count_visible_by_account(&self, account_id: Uuid) -> ServiceResult<u64>;
    /// Cascading step of a withdrawal: hides every comment of the account.
    async fn hide_all_by_account(&self, account_id: Uuid) -> ServiceResult<u64>;
}

pub struct CommentsServiceImpl {
    comments_repo: Arc<dyn CommentsRepo>,
    regions: Arc<RegionDirectory>,
}

impl CommentsServiceImpl {
    pub fn new(comments_repo: Arc<dyn CommentsRepo>, regions: Arc<RegionDirectory>) -> Self {
        Self {
            comments_repo,
            regions,
        }
    }
}

#[async_trait]
impl CommentsService for CommentsServiceImpl {
    async fn post(
        &self,
        author: &accounts::Model,
        region_code: &str,
        content: &str,
    ) -> ServiceResult<CommentView> {
        if !self.regions.contains(region_code) {
            return Err(ServiceError::validation(format!(
                "unknown region code: {region_code}"
            )));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("comment must not be empty"));
        }
        if content.chars().count() > COMMENT_MAX_CHARS {
            return Err(ServiceError::validation(format!(
                "comment must be at most {COMMENT_MAX_CHARS} characters"
            )));
        }

        let comment = self
            .comments_repo
            .insert(comments::ActiveModel {
                id: Set(Uuid::new_v4()),
                account_id: Set(author.id),
                region_code: Set(region_code.to_string()),
                content: Set(content.to_string()),
                visible_to_user: Set(true),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        Ok(CommentView {
            comment,
            author_nickname: author.nickname.clone(),
        })
    }

    async fn list_by_region(&self, region_code: &str) -> ServiceResult<Vec<CommentView>> {
        let rows = self.comments_repo.list_visible_by_region(region_code).await?;
        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentView {
                comment,
                author_nickname: author.and_then(|account| account.nickname),
            })
            .collect())
    }

    async fn count_visible_by_account(&self, account_id: Uuid) -> ServiceResult<u64> {
        Ok(self.comments_repo.count_visible_by_account(account_id).await?)
    }

    async fn hide_all_by_account(&self, account_id: Uuid) -> ServiceResult<u64> {
        let hidden = self.comments_repo.hide_all_by_account(account_id).await?;
        tracing::info!(%account_id, hidden, "hid comments of withdrawn account");
        Ok(hidden)
    }
}
