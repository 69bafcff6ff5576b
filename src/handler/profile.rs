use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ErrorResponse, ServiceError},
    handler::{auth::LoginResponse, extract::AuthenticatedAccount},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNicknameRequest {
    pub nickname: String,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/profile/nickname", put(update_nickname))
        .route("/api/auth/account", delete(withdraw))
        .with_state(state)
}

#[utoipa::path(
    put,
    path = "/api/auth/profile/nickname",
    request_body = UpdateNicknameRequest,
    responses(
        (status = 200, description = "Nickname updated", body = LoginResponse),
        (status = 400, description = "Invalid nickname", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
pub async fn update_nickname(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedAccount,
    Json(payload): Json<UpdateNicknameRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let account = state
        .accounts()
        .update_nickname(&caller.email, &payload.nickname)
        .await?;

    Ok(Json(LoginResponse::new(
        caller.token,
        account,
        "닉네임이 변경되었습니다.",
    )))
}

/// Withdraws the caller: soft-deletes the account, then hides its comments.
#[utoipa::path(
    delete,
    path = "/api/auth/account",
    responses(
        (status = 204, description = "Account withdrawn"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedAccount,
) -> Result<StatusCode, ServiceError> {
    state.withdrawal().withdraw(&caller.email).await?;

    Ok(StatusCode::NO_CONTENT)
}
