use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::LoginResponse;
use crate::{
    error::{ErrorResponse, ServiceError},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/google", post(google_login))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/auth/google",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Logged in with Google", body = LoginResponse),
        (status = 400, description = "Missing ID token", body = ErrorResponse),
        (status = 401, description = "ID token rejected", body = ErrorResponse),
        (status = 409, description = "Email owned by another sign-in method", body = ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn google_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let output = state.auth().google_login(&payload.id_token).await?;
    Ok(Json(LoginResponse::new(output.token, output.account, "로그인 성공")))
}
