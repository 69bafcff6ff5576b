use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handler;
pub mod openapi;
pub mod repo;
pub mod schema;
pub mod service;
pub mod state;

use crate::{openapi::ApiDoc, state::AppState};

/// Full application router: API routes, Swagger UI, CORS and request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handler::health::routes())
        .merge(handler::auth::routes(state.clone()))
        .merge(handler::profile::routes(state.clone()))
        .merge(handler::broadcast::routes(state.clone()))
        .merge(handler::comments::routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
