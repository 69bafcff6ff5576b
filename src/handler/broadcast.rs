use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};
use utoipa::ToSchema;

use crate::{service::broadcast::BroadcastInfo, state::AppState};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastInfoResponse {
    pub title: String,
    pub mc: String,
    pub time: String,
    pub region_code: String,
    pub region_name: String,
}

impl From<BroadcastInfo> for BroadcastInfoResponse {
    fn from(info: BroadcastInfo) -> Self {
        Self {
            title: info.title,
            mc: info.mc,
            time: info.time,
            region_code: info.region_code,
            region_name: info.region_name,
        }
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tbn/regions", get(list_regions))
        .route("/api/tbn/broadcast/:region_code", get(get_broadcast))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/tbn/regions",
    responses(
        (status = 200, description = "Region code to name", body = BTreeMap<String, String>)
    ),
    tag = "tbn"
)]
pub async fn list_regions(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, String>> {
    Json(state.regions().all())
}

#[utoipa::path(
    get,
    path = "/api/tbn/broadcast/{regionCode}",
    params(
        ("regionCode" = String, Path, description = "TBN area code")
    ),
    responses(
        (status = 200, description = "Current programme, placeholders when unavailable", body = BroadcastInfoResponse)
    ),
    tag = "tbn"
)]
pub async fn get_broadcast(
    State(state): State<Arc<AppState>>,
    Path(region_code): Path<String>,
) -> Json<BroadcastInfoResponse> {
    Json(state.broadcast().lookup(&region_code).await.into())
}
