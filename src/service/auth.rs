use argon2::{password_hash::PasswordHash, Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;
use sea_orm::{Set, SqlErr};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::accounts,
    error::{ServiceError, ServiceResult},
    repo::accounts::AccountsRepo,
    service::{
        accounts::{AccountsService, ReconcileInput},
        identity::IdentityVerifier,
        lifecycle::LifecycleService,
        nickname,
        token::TokenService,
    },
};

const PASSWORD_MIN_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug)]
pub struct LoginOutput {
    pub account: accounts::Model,
    pub token: String,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ServiceResult<accounts::Model>;
    async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutput>;
    async fn google_login(&self, id_token: &str) -> ServiceResult<LoginOutput>;
    /// Reactivates a withdrawn local account after checking its password.
    async fn restore_local(&self, email: &str, password: &str) -> ServiceResult<LoginOutput>;
}

pub struct AuthServiceImpl {
    accounts_repo: Arc<dyn AccountsRepo>,
    accounts: Arc<dyn AccountsService>,
    lifecycle: Arc<dyn LifecycleService>,
    tokens: Arc<dyn TokenService>,
    verifier: Arc<dyn IdentityVerifier>,
}

impl AuthServiceImpl {
    pub fn new(
        accounts_repo: Arc<dyn AccountsRepo>,
        accounts: Arc<dyn AccountsService>,
        lifecycle: Arc<dyn LifecycleService>,
        tokens: Arc<dyn TokenService>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            accounts_repo,
            accounts,
            lifecycle,
            tokens,
            verifier,
        }
    }

    pub fn normalize_email(email: &str) -> ServiceResult<String> {
        let value = email.trim().to_lowercase();
        if value.is_empty() || !value.contains('@') {
            return Err(ServiceError::validation("invalid email"));
        }
        Ok(value)
    }

    fn validate_password(password: &str) -> ServiceResult<()> {
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(ServiceError::validation(format!(
                "password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        Ok(())
    }

    fn hash_password(password: &str) -> ServiceResult<String> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = argon2::password_hash::SaltString::encode_b64(&salt)
            .map_err(|err| ServiceError::PasswordHash(err.to_string()))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| ServiceError::PasswordHash(err.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn verify_password(account: &accounts::Model, password: &str) -> ServiceResult<()> {
        let Some(hash) = account.password_hash.as_deref() else {
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        };
        let parsed = PasswordHash::new(hash)
            .map_err(|_| ServiceError::unauthenticated(INVALID_CREDENTIALS))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| ServiceError::unauthenticated(INVALID_CREDENTIALS))
    }

    fn issue(&self, account: accounts::Model) -> ServiceResult<LoginOutput> {
        let token = self.tokens.issue(&account.email)?;
        Ok(LoginOutput { account, token })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ServiceResult<accounts::Model> {
        let email = Self::normalize_email(email)?;
        Self::validate_password(password)?;
        let name = name.map(str::trim).filter(|name| !name.is_empty());

        if self.accounts_repo.exists_by_email(&email).await? {
            return Err(ServiceError::conflict("email already registered"));
        }

        let password_hash = Self::hash_password(password)?;
        let now = Utc::now();
        let model = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.clone()),
            display_name: Set(name.map(str::to_string)),
            nickname: Set(Some(nickname::candidate(name, Some(&email)))),
            avatar_url: Set(None),
            password_hash: Set(Some(password_hash)),
            provider: Set(None),
            provider_subject: Set(None),
            deleted: Set(false),
            deleted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let account = self.accounts_repo.insert(model).await.map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::conflict("email already registered")
            } else {
                ServiceError::from(err)
            }
        })?;

        tracing::info!(account_id = %account.id, "registered local account");
        Ok(account)
    }

    async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutput> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        }

        let Some(account) = self.accounts_repo.find_active_by_email(&email).await? else {
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        };
        Self::verify_password(&account, password)?;

        self.issue(account)
    }

    async fn google_login(&self, id_token: &str) -> ServiceResult<LoginOutput> {
        if id_token.trim().is_empty() {
            return Err(ServiceError::validation("Google ID token is required"));
        }

        let identity = self.verifier.verify(id_token).await?;
        let account = self
            .accounts
            .reconcile(ReconcileInput {
                email: identity.email,
                display_name: identity.display_name,
                avatar_url: identity.avatar_url,
                provider: self.verifier.provider().to_string(),
                provider_subject: identity.subject,
            })
            .await?;

        self.issue(account)
    }

    async fn restore_local(&self, email: &str, password: &str) -> ServiceResult<LoginOutput> {
        let email = email.trim().to_lowercase();
        let Some(account) = self.accounts_repo.find_latest_by_email(&email).await? else {
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        };
        Self::verify_password(&account, password)?;
        if !account.deleted {
            return Err(ServiceError::conflict("account is not withdrawn"));
        }

        let account = self.lifecycle.restore(&email).await?;
        self.issue(account)
    }
}
