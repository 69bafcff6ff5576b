#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tbn_api::{
    build_router,
    config::Config,
    error::{ServiceError, ServiceResult},
    service::{
        config::ConfigServiceImpl,
        identity::{IdentityVerifier, VerifiedIdentity, PROVIDER_GOOGLE},
    },
    state::{AppState, SeaOrmDatabaseClient},
};
use tower::ServiceExt;

/// Accepts ID tokens shaped `google:<email>:<name>` and rejects everything else.
pub struct FakeGoogleVerifier;

#[async_trait]
impl IdentityVerifier for FakeGoogleVerifier {
    fn provider(&self) -> &'static str {
        PROVIDER_GOOGLE
    }

    async fn verify(&self, id_token: &str) -> ServiceResult<VerifiedIdentity> {
        let mut parts = id_token.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("google"), Some(email), name) if email.contains('@') => Ok(VerifiedIdentity {
                email: email.to_string(),
                display_name: name.map(str::to_string),
                avatar_url: None,
                subject: format!("sub-{email}"),
            }),
            _ => Err(ServiceError::unauthenticated("invalid Google ID token")),
        }
    }
}

pub fn config(broadcast_base_url: &str) -> Config {
    Config {
        port: 0,
        database_url: Some("sqlite::memory:".to_string()),
        jwt_secret: Some("integration-secret-key-0123456789".to_string()),
        jwt_ttl_seconds: 3600,
        google_client_id: Some("client-123".to_string()),
        google_tokeninfo_url: "http://127.0.0.1:9/tokeninfo".to_string(),
        broadcast_base_url: broadcast_base_url.to_string(),
        broadcast_timeout_seconds: 2,
        broadcast_user_agent: "tbn-api-test".to_string(),
    }
}

pub async fn app_with_broadcast(broadcast_base_url: &str) -> Router {
    let db = Arc::new(
        SeaOrmDatabaseClient::connect("sqlite::memory:")
            .await
            .expect("in-memory database"),
    );
    let config = Arc::new(ConfigServiceImpl::from_config(config(broadcast_base_url)));
    let state = AppState::build(db, config, Arc::new(FakeGoogleVerifier)).expect("app state");
    build_router(state)
}

pub async fn app() -> Router {
    app_with_broadcast("http://127.0.0.1:9/onair").await
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub async fn register_and_login(app: &Router, email: &str, name: Option<&str>) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(serde_json::json!({ "email": email, "password": "password123", "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token").to_string()
}
