use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{Set, SqlErr, TransactionError, TransactionTrait};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::{accounts, withdrawal_records},
    error::{ServiceError, ServiceResult},
    repo::{accounts::AccountsRepo, withdrawal_records::WithdrawalRecordsRepo},
    service::nickname,
    state::DatabaseClient,
};

#[derive(Debug)]
pub struct WithdrawalOutcome {
    pub account: accounts::Model,
    pub record: withdrawal_records::Model,
}

#[async_trait]
pub trait LifecycleService: Send + Sync {
    /// Marks the active account as deleted and archives a snapshot of it, atomically.
    async fn soft_delete(&self, email: &str) -> ServiceResult<WithdrawalOutcome>;
    /// Reactivates the account and resets its nickname. Hidden content stays hidden.
    async fn restore(&self, email: &str) -> ServiceResult<accounts::Model>;
}

pub struct LifecycleServiceImpl {
    db: Arc<dyn DatabaseClient>,
    accounts_repo: Arc<dyn AccountsRepo>,
    withdrawal_repo: Arc<dyn WithdrawalRecordsRepo>,
}

impl LifecycleServiceImpl {
    pub fn new(
        db: Arc<dyn DatabaseClient>,
        accounts_repo: Arc<dyn AccountsRepo>,
        withdrawal_repo: Arc<dyn WithdrawalRecordsRepo>,
    ) -> Self {
        Self {
            db,
            accounts_repo,
            withdrawal_repo,
        }
    }
}

fn snapshot(account: &accounts::Model) -> withdrawal_records::ActiveModel {
    let withdrawn_at = account.deleted_at.unwrap_or_else(|| Utc::now().into());
    withdrawal_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(account.id),
        email: Set(account.email.clone()),
        display_name: Set(account.display_name.clone()),
        nickname: Set(account.nickname.clone()),
        avatar_url: Set(account.avatar_url.clone()),
        provider: Set(account.provider.clone()),
        provider_subject: Set(account.provider_subject.clone()),
        withdrawn_at: Set(withdrawn_at),
    }
}

#[async_trait]
impl LifecycleService for LifecycleServiceImpl {
    async fn soft_delete(&self, email: &str) -> ServiceResult<WithdrawalOutcome> {
        let accounts_repo = self.accounts_repo.clone();
        let withdrawal_repo = self.withdrawal_repo.clone();
        let email = email.to_string();

        let result = self
            .db
            .conn()
            .transaction::<_, WithdrawalOutcome, ServiceError>(|txn| {
                Box::pin(async move {
                    let Some(account) = accounts_repo
                        .find_active_by_email_with_txn(txn, &email)
                        .await?
                    else {
                        return Err(ServiceError::not_found(format!(
                            "account not found: {email}"
                        )));
                    };

                    let now = Utc::now();
                    let mut active: accounts::ActiveModel = account.into();
                    active.deleted = Set(true);
                    active.deleted_at = Set(Some(now.into()));
                    active.updated_at = Set(now.into());
                    let account = accounts_repo.update_with_txn(txn, active).await?;

                    let record = withdrawal_repo
                        .insert_with_txn(txn, snapshot(&account))
                        .await?;

                    Ok(WithdrawalOutcome { account, record })
                })
            })
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(TransactionError::Connection(err)) => return Err(err.into()),
            Err(TransactionError::Transaction(err)) => return Err(err),
        };

        tracing::info!(
            account_id = %outcome.account.id,
            record_id = %outcome.record.id,
            "account withdrawn"
        );
        Ok(outcome)
    }

    async fn restore(&self, email: &str) -> ServiceResult<accounts::Model> {
        let Some(account) = self.accounts_repo.find_latest_by_email(email).await? else {
            return Err(ServiceError::not_found(format!("account not found: {email}")));
        };

        let nickname = nickname::candidate(account.display_name.as_deref(), Some(&account.email));
        let mut active: accounts::ActiveModel = account.into();
        active.deleted = Set(false);
        active.deleted_at = Set(None);
        active.nickname = Set(Some(nickname));
        active.updated_at = Set(Utc::now().into());

        let account = self.accounts_repo.update(active).await.map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::conflict("email is already used by another active account")
            } else {
                ServiceError::from(err)
            }
        })?;

        tracing::info!(account_id = %account.id, "account restored");
        Ok(account)
    }
}
