use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{ServiceError, ServiceResult},
    repo::accounts::AccountsRepo,
    service::{comments::CommentsService, lifecycle::LifecycleService},
};

/// Account withdrawal as seen by the user: soft delete followed by hiding the
/// account's comments.
#[async_trait]
pub trait WithdrawalService: Send + Sync {
    /// Returns the withdrawn account id. Repeating the call after the comment step
    /// failed finishes that step instead of reporting `NotFound`.
    async fn withdraw(&self, email: &str) -> ServiceResult<Uuid>;
}

pub struct WithdrawalServiceImpl {
    accounts_repo: Arc<dyn AccountsRepo>,
    lifecycle: Arc<dyn LifecycleService>,
    comments: Arc<dyn CommentsService>,
}

impl WithdrawalServiceImpl {
    pub fn new(
        accounts_repo: Arc<dyn AccountsRepo>,
        lifecycle: Arc<dyn LifecycleService>,
        comments: Arc<dyn CommentsService>,
    ) -> Self {
        Self {
            accounts_repo,
            lifecycle,
            comments,
        }
    }

    /// A withdrawn account that still shows comments: its cascade never completed.
    async fn interrupted_withdrawal(&self, email: &str) -> ServiceResult<Option<Uuid>> {
        let Some(account) = self.accounts_repo.find_latest_by_email(email).await? else {
            return Ok(None);
        };
        if !account.deleted {
            return Ok(None);
        }
        let visible = self.comments.count_visible_by_account(account.id).await?;
        Ok((visible > 0).then_some(account.id))
    }
}

#[async_trait]
impl WithdrawalService for WithdrawalServiceImpl {
    async fn withdraw(&self, email: &str) -> ServiceResult<Uuid> {
        let account_id = match self.lifecycle.soft_delete(email).await {
            Ok(outcome) => outcome.account.id,
            Err(ServiceError::NotFound(message)) => {
                match self.interrupted_withdrawal(email).await? {
                    Some(account_id) => {
                        tracing::warn!(%account_id, "resuming interrupted withdrawal");
                        account_id
                    }
                    None => return Err(ServiceError::NotFound(message)),
                }
            }
            Err(err) => return Err(err),
        };

        self.comments.hide_all_by_account(account_id).await?;
        Ok(account_id)
    }
}
