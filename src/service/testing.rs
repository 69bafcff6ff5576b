use chrono::Utc;
use sea_orm::Set;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::Config,
    entities::accounts,
    repo::accounts::AccountsRepo,
    state::{DatabaseClient, SeaOrmDatabaseClient},
};

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: Some("sqlite::memory:".to_string()),
        jwt_secret: Some("test-secret-key-at-least-32-bytes".to_string()),
        jwt_ttl_seconds: 3600,
        google_client_id: Some("client-123".to_string()),
        google_tokeninfo_url: "http://127.0.0.1:9/tokeninfo".to_string(),
        broadcast_base_url: "http://127.0.0.1:9/onair".to_string(),
        broadcast_timeout_seconds: 2,
        broadcast_user_agent: "tbn-api-test".to_string(),
    }
}

pub async fn memory_db() -> Arc<dyn DatabaseClient> {
    Arc::new(
        SeaOrmDatabaseClient::connect("sqlite::memory:")
            .await
            .expect("in-memory database"),
    )
}

pub async fn insert_account(
    repo: &dyn AccountsRepo,
    email: &str,
    display_name: Option<&str>,
    nickname: Option<&str>,
) -> accounts::Model {
    let now = Utc::now();
    repo.insert(accounts::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        display_name: Set(display_name.map(str::to_string)),
        nickname: Set(nickname.map(str::to_string)),
        avatar_url: Set(Some("https://example.com/avatar.png".to_string())),
        password_hash: Set(None),
        provider: Set(Some("google".to_string())),
        provider_subject: Set(Some(format!("sub-{email}"))),
        deleted: Set(false),
        deleted_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .await
    .expect("insert account")
}
