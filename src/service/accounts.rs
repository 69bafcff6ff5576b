use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{SqlErr, Set};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::accounts,
    error::{ServiceError, ServiceResult},
    repo::accounts::AccountsRepo,
    service::nickname,
};

pub const NICKNAME_MAX_CHARS: usize = 30;

/// An identity asserted by a federated provider, already verified upstream.
#[derive(Clone, Debug)]
pub struct ReconcileInput {
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: String,
    pub provider_subject: String,
}

#[async_trait]
pub trait AccountsService: Send + Sync {
    /// Finds or creates the local account for a federated identity and syncs it.
    async fn reconcile(&self, input: ReconcileInput) -> ServiceResult<accounts::Model>;
    async fn find_active_by_email(&self, email: &str) -> ServiceResult<Option<accounts::Model>>;
    async fn update_nickname(&self, email: &str, nickname: &str)
        -> ServiceResult<accounts::Model>;
}

pub struct AccountsServiceImpl {
    accounts_repo: Arc<dyn AccountsRepo>,
}

impl AccountsServiceImpl {
    pub fn new(accounts_repo: Arc<dyn AccountsRepo>) -> Self {
        Self { accounts_repo }
    }

    async fn find_existing(&self, input: &ReconcileInput) -> ServiceResult<Option<accounts::Model>> {
        if let Some(account) = self
            .accounts_repo
            .find_by_provider_subject(&input.provider, &input.provider_subject)
            .await?
        {
            return Ok(Some(account));
        }

        Ok(self
            .accounts_repo
            .find_by_email_and_provider(&input.email, &input.provider)
            .await?)
    }

    async fn sync_existing(
        &self,
        existing: accounts::Model,
        input: &ReconcileInput,
        candidate: String,
    ) -> ServiceResult<accounts::Model> {
        let was_deleted = existing.deleted;
        let keep_nickname = !was_deleted
            && existing
                .nickname
                .as_deref()
                .is_some_and(|nickname| !nickname.is_empty());

        let mut active: accounts::ActiveModel = existing.into();
        if was_deleted {
            active.deleted = Set(false);
            active.deleted_at = Set(None);
        }
        if !keep_nickname {
            active.nickname = Set(Some(candidate));
        }
        active.display_name = Set(input.display_name.clone());
        active.avatar_url = Set(input.avatar_url.clone());
        active.provider_subject = Set(Some(input.provider_subject.clone()));
        active.updated_at = Set(Utc::now().into());

        let account = self.accounts_repo.update(active).await.map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::conflict("email is already used by another active account")
            } else {
                ServiceError::from(err)
            }
        })?;

        if was_deleted {
            tracing::info!(account_id = %account.id, provider = %input.provider, "restored withdrawn account on federated login");
        }
        Ok(account)
    }
}

#[async_trait]
impl AccountsService for AccountsServiceImpl {
    async fn reconcile(&self, input: ReconcileInput) -> ServiceResult<accounts::Model> {
        let candidate = nickname::candidate(input.display_name.as_deref(), Some(&input.email));

        if let Some(existing) = self.find_existing(&input).await? {
            return self.sync_existing(existing, &input, candidate).await;
        }

        let now = Utc::now();
        let model = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email.clone()),
            display_name: Set(input.display_name.clone()),
            nickname: Set(Some(candidate.clone())),
            avatar_url: Set(input.avatar_url.clone()),
            password_hash: Set(None),
            provider: Set(Some(input.provider.clone())),
            provider_subject: Set(Some(input.provider_subject.clone())),
            deleted: Set(false),
            deleted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match self.accounts_repo.insert(model).await {
            Ok(account) => {
                tracing::info!(account_id = %account.id, provider = %input.provider, "created federated account");
                Ok(account)
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                // Lost a race with a concurrent login, or the email belongs to another sign-in method.
                tracing::warn!(provider = %input.provider, "account insert conflicted, retrying lookup");
                match self.find_existing(&input).await? {
                    Some(existing) => self.sync_existing(existing, &input, candidate).await,
                    None => Err(ServiceError::conflict(
                        "email is already registered with another sign-in method",
                    )),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_active_by_email(&self, email: &str) -> ServiceResult<Option<accounts::Model>> {
        Ok(self.accounts_repo.find_active_by_email(email).await?)
    }

    async fn update_nickname(
        &self,
        email: &str,
        nickname: &str,
    ) -> ServiceResult<accounts::Model> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(ServiceError::validation("nickname must not be empty"));
        }
        if nickname.chars().count() > NICKNAME_MAX_CHARS {
            return Err(ServiceError::validation(format!(
                "nickname must be at most {NICKNAME_MAX_CHARS} characters"
            )));
        }

        let Some(account) = self.accounts_repo.find_active_by_email(email).await? else {
            return Err(ServiceError::not_found(format!("account not found: {email}")));
        };

        let mut active: accounts::ActiveModel = account.into();
        active.nickname = Set(Some(nickname.to_string()));
        active.updated_at = Set(Utc::now().into());
        Ok(self.accounts_repo.update(active).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repo::accounts::SeaOrmAccountsRepo, service::testing::memory_db, state::DatabaseClient,
    };
    use sea_orm::{DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait};

    /// Lets a concurrent login win every insert: the same identity is written under
    /// a different id just before the requested row.
    struct RacingAccountsRepo {
        inner: SeaOrmAccountsRepo,
    }

    #[async_trait]
    impl AccountsRepo for RacingAccountsRepo {
        async fn insert(&self, model: accounts::ActiveModel) -> Result<accounts::Model, DbErr> {
            let mut rival = model.clone();
            rival.id = Set(Uuid::new_v4());
            self.inner.insert(rival).await?;
            self.inner.insert(model).await
        }

        async fn update(&self, model: accounts::ActiveModel) -> Result<accounts::Model, DbErr> {
            self.inner.update(model).await
        }

        async fn update_with_txn(
            &self,
            txn: &DatabaseTransaction,
            model: accounts::ActiveModel,
        ) -> Result<accounts::Model, DbErr> {
            self.inner.update_with_txn(txn, model).await
        }

        async fn find_active_by_email(&self, email: &str) -> Result<Option<accounts::Model>, DbErr> {
            self.inner.find_active_by_email(email).await
        }

        async fn find_active_by_email_with_txn(
            &self,
            txn: &DatabaseTransaction,
            email: &str,
        ) -> Result<Option<accounts::Model>, DbErr> {
            self.inner.find_active_by_email_with_txn(txn, email).await
        }

        async fn find_latest_by_email(&self, email: &str) -> Result<Option<accounts::Model>, DbErr> {
            self.inner.find_latest_by_email(email).await
        }

        async fn find_by_provider_subject(
            &self,
            provider: &str,
            provider_subject: &str,
        ) -> Result<Option<accounts::Model>, DbErr> {
            self.inner
                .find_by_provider_subject(provider, provider_subject)
                .await
        }

        async fn find_by_email_and_provider(
            &self,
            email: &str,
            provider: &str,
        ) -> Result<Option<accounts::Model>, DbErr> {
            self.inner.find_by_email_and_provider(email, provider).await
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool, DbErr> {
            self.inner.exists_by_email(email).await
        }
    }

    fn google(email: &str, name: Option<&str>, subject: &str) -> ReconcileInput {
        ReconcileInput {
            email: email.to_string(),
            display_name: name.map(str::to_string),
            avatar_url: Some(format!("https://example.com/{subject}.png")),
            provider: "google".to_string(),
            provider_subject: subject.to_string(),
        }
    }

    async fn service() -> (AccountsServiceImpl, Arc<dyn AccountsRepo>) {
        let db = memory_db().await;
        let repo: Arc<dyn AccountsRepo> = Arc::new(SeaOrmAccountsRepo::new(db));
        (AccountsServiceImpl::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn first_login_creates_account_with_display_name_nickname() {
        let (accounts, _) = service().await;

        let account = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();

        assert_eq!(account.nickname.as_deref(), Some("Jane"));
        assert_eq!(account.provider.as_deref(), Some("google"));
        assert_eq!(account.provider_subject.as_deref(), Some("g-1"));
        assert!(!account.deleted);
        assert!(account.password_hash.is_none());
    }

    #[tokio::test]
    async fn nameless_identity_uses_email_local_part() {
        let (accounts, _) = service().await;

        let account = accounts
            .reconcile(google("bob@x.com", None, "g-2"))
            .await
            .unwrap();

        assert_eq!(account.nickname.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn active_account_keeps_chosen_nickname() {
        let (accounts, _) = service().await;
        let created = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();
        accounts.update_nickname("jane@x.com", "radio-fan").await.unwrap();

        let synced = accounts
            .reconcile(google("jane@x.com", Some("Jane Doe"), "g-1"))
            .await
            .unwrap();

        assert_eq!(synced.id, created.id);
        assert_eq!(synced.display_name.as_deref(), Some("Jane Doe"));
        assert_eq!(synced.nickname.as_deref(), Some("radio-fan"));
    }

    #[tokio::test]
    async fn active_account_without_nickname_gets_candidate() {
        let (accounts, repo) = service().await;
        let created = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();
        let mut active: accounts::ActiveModel = created.into();
        active.nickname = Set(Some(String::new()));
        repo.update(active).await.unwrap();

        let synced = accounts
            .reconcile(google("jane@x.com", Some("Janet"), "g-1"))
            .await
            .unwrap();

        assert_eq!(synced.nickname.as_deref(), Some("Janet"));
    }

    #[tokio::test]
    async fn matches_by_email_and_provider_when_subject_changed() {
        let (accounts, _) = service().await;
        let created = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "old-subject"))
            .await
            .unwrap();

        let synced = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "new-subject"))
            .await
            .unwrap();

        assert_eq!(synced.id, created.id);
        assert_eq!(synced.provider_subject.as_deref(), Some("new-subject"));
    }

    #[tokio::test]
    async fn withdrawn_account_is_revived_with_fresh_nickname() {
        let (accounts, repo) = service().await;
        let created = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();
        accounts.update_nickname("jane@x.com", "radio-fan").await.unwrap();
        let current = repo.find_active_by_email("jane@x.com").await.unwrap().unwrap();
        let mut active: accounts::ActiveModel = current.into();
        active.deleted = Set(true);
        active.deleted_at = Set(Some(Utc::now().into()));
        repo.update(active).await.unwrap();

        let revived = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();

        assert_eq!(revived.id, created.id);
        assert!(!revived.deleted);
        assert!(revived.deleted_at.is_none());
        assert_eq!(revived.nickname.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn repeated_assertion_is_idempotent() {
        let (accounts, _) = service().await;
        let first = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();
        let second = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.nickname, second.nickname);
        assert_eq!(first.display_name, second.display_name);
        assert_eq!(first.avatar_url, second.avatar_url);
    }

    #[tokio::test]
    async fn email_owned_by_local_account_conflicts() {
        let (accounts, repo) = service().await;
        let now = Utc::now();
        repo.insert(accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set("jane@x.com".to_string()),
            display_name: Set(None),
            nickname: Set(Some("jane".to_string())),
            avatar_url: Set(None),
            password_hash: Set(Some("hash".to_string())),
            provider: Set(None),
            provider_subject: Set(None),
            deleted: Set(false),
            deleted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        })
        .await
        .unwrap();

        let err = accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn lost_insert_race_syncs_the_winning_row() {
        let db = memory_db().await;
        let service = AccountsServiceImpl::new(Arc::new(RacingAccountsRepo {
            inner: SeaOrmAccountsRepo::new(db.clone()),
        }));

        let account = service
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();

        assert!(!account.deleted);
        assert_eq!(account.provider_subject.as_deref(), Some("g-1"));
        assert_eq!(account.nickname.as_deref(), Some("Jane"));
        assert_eq!(accounts::Entity::find().count(db.conn()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_nickname_validates_input() {
        let (accounts, _) = service().await;
        accounts
            .reconcile(google("jane@x.com", Some("Jane"), "g-1"))
            .await
            .unwrap();

        assert!(matches!(
            accounts.update_nickname("jane@x.com", "   ").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            accounts
                .update_nickname("jane@x.com", &"x".repeat(NICKNAME_MAX_CHARS + 1))
                .await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            accounts.update_nickname("nobody@x.com", "name").await,
            Err(ServiceError::NotFound(_))
        ));

        let updated = accounts.update_nickname("jane@x.com", "  J  ").await.unwrap();
        assert_eq!(updated.nickname.as_deref(), Some("J"));
    }
}
