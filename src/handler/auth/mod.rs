use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{entities::accounts, state::AppState};

pub mod google;
pub mod password;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    pub nickname: Option<String>,
    pub message: String,
}

impl LoginResponse {
    pub fn new(token: String, account: accounts::Model, message: &str) -> Self {
        Self {
            token,
            email: account.email,
            nickname: account.nickname,
            message: message.to_string(),
        }
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(password::routes(state.clone()))
        .merge(google::routes(state))
}
