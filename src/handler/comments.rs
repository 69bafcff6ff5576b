use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{ErrorResponse, ServiceError},
    handler::extract::AuthenticatedAccount,
    service::comments::CommentView,
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub region_code: String,
    pub content: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub region_code: String,
    pub content: String,
    pub nickname: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CommentView> for CommentResponse {
    fn from(view: CommentView) -> Self {
        Self {
            id: view.comment.id,
            region_code: view.comment.region_code,
            content: view.comment.content,
            nickname: view.author_nickname,
            created_at: view.comment.created_at.with_timezone(&Utc),
        }
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/comments", post(create_comment))
        .route("/api/comments/:region_code", get(list_comments))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/comments/{regionCode}",
    params(
        ("regionCode" = String, Path, description = "TBN area code")
    ),
    responses(
        (status = 200, description = "Visible comments, newest first", body = [CommentResponse])
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(region_code): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, ServiceError> {
    let comments = state.comments().list_by_region(&region_code).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Created", body = CommentResponse),
        (status = 400, description = "Invalid comment", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedAccount,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ServiceError> {
    let Some(author) = state.accounts().find_active_by_email(&caller.email).await? else {
        return Err(ServiceError::unauthenticated("account is no longer active"));
    };

    let view = state
        .comments()
        .post(&author, &payload.region_code, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(view.into())))
}
