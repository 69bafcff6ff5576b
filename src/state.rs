use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    repo::{
        accounts::SeaOrmAccountsRepo, comments::SeaOrmCommentsRepo,
        withdrawal_records::SeaOrmWithdrawalRecordsRepo,
    },
    service::{
        accounts::{AccountsService, AccountsServiceImpl},
        auth::{AuthService, AuthServiceImpl},
        broadcast::{BroadcastLookup, LookupFailure, TbnBroadcastService},
        comments::{CommentsService, CommentsServiceImpl},
        config::ConfigService,
        identity::{GoogleIdentityVerifier, IdentityVerifier},
        lifecycle::{LifecycleService, LifecycleServiceImpl},
        regions::RegionDirectory,
        token::{JwtTokenService, TokenService},
        withdrawal::{WithdrawalService, WithdrawalServiceImpl},
    },
};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("broadcast client error: {0}")]
    Broadcast(#[from] LookupFailure),
}

pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    /// Connects and applies the schema before handing the connection out.
    pub async fn connect(url: &str) -> Result<Self, DbErr> {
        let conn = crate::db::connect(url).await?;
        crate::schema::apply(&conn).await?;
        Ok(Self { conn })
    }
}

impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

pub struct AppState {
    accounts: Arc<dyn AccountsService>,
    withdrawal: Arc<dyn WithdrawalService>,
    auth: Arc<dyn AuthService>,
    tokens: Arc<dyn TokenService>,
    comments: Arc<dyn CommentsService>,
    broadcast: Arc<dyn BroadcastLookup>,
    regions: Arc<RegionDirectory>,
}

impl AppState {
    pub async fn new(config: Arc<dyn ConfigService>) -> Result<Arc<Self>, StartupError> {
        let values = config.values();
        let Some(database_url) = values.database_url.clone() else {
            return Err(StartupError::Config("DATABASE_URL is not set".to_string()));
        };
        let db = Arc::new(SeaOrmDatabaseClient::connect(&database_url).await?);
        let verifier = Arc::new(GoogleIdentityVerifier::new(
            values.google_tokeninfo_url.clone(),
            values.google_client_id.clone(),
        ));

        Self::build(db, config, verifier)
    }

    /// Wires services over an already prepared database and identity verifier.
    pub fn build(
        db: Arc<dyn DatabaseClient>,
        config: Arc<dyn ConfigService>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Result<Arc<Self>, StartupError> {
        let values = config.values();
        let Some(jwt_secret) = values.jwt_secret.as_deref() else {
            return Err(StartupError::Config("JWT_SECRET is not set".to_string()));
        };

        let regions = Arc::new(RegionDirectory::tbn());
        let accounts_repo = Arc::new(SeaOrmAccountsRepo::new(db.clone()));
        let withdrawal_repo = Arc::new(SeaOrmWithdrawalRecordsRepo);
        let comments_repo = Arc::new(SeaOrmCommentsRepo::new(db.clone()));

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
            jwt_secret.as_bytes(),
            values.jwt_ttl_seconds,
        ));
        let accounts: Arc<dyn AccountsService> =
            Arc::new(AccountsServiceImpl::new(accounts_repo.clone()));
        let lifecycle: Arc<dyn LifecycleService> = Arc::new(LifecycleServiceImpl::new(
            db.clone(),
            accounts_repo.clone(),
            withdrawal_repo,
        ));
        let auth: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            accounts_repo.clone(),
            accounts.clone(),
            lifecycle.clone(),
            tokens.clone(),
            verifier,
        ));
        let comments: Arc<dyn CommentsService> =
            Arc::new(CommentsServiceImpl::new(comments_repo, regions.clone()));
        let withdrawal: Arc<dyn WithdrawalService> = Arc::new(WithdrawalServiceImpl::new(
            accounts_repo,
            lifecycle,
            comments.clone(),
        ));
        let broadcast: Arc<dyn BroadcastLookup> =
            Arc::new(TbnBroadcastService::new(values, regions.clone())?);

        Ok(Arc::new(Self {
            accounts,
            withdrawal,
            auth,
            tokens,
            comments,
            broadcast,
            regions,
        }))
    }

    pub fn accounts(&self) -> &dyn AccountsService {
        self.accounts.as_ref()
    }

    pub fn withdrawal(&self) -> &dyn WithdrawalService {
        self.withdrawal.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthService {
        self.auth.as_ref()
    }

    pub fn tokens(&self) -> &dyn TokenService {
        self.tokens.as_ref()
    }

    pub fn comments(&self) -> &dyn CommentsService {
        self.comments.as_ref()
    }

    pub fn broadcast(&self) -> &dyn BroadcastLookup {
        self.broadcast.as_ref()
    }

    pub fn regions(&self) -> &RegionDirectory {
        self.regions.as_ref()
    }
}
