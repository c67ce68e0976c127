//! Host routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::api::error::ApiResult;
use crate::api::models::RegisterHostRequest;
use crate::api::server::AppState;
use crate::database::models::Host;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_hosts).post(register_host))
        .route("/{id}", get(get_host))
}

async fn list_hosts(State(state): State<AppState>) -> ApiResult<Json<Vec<Host>>> {
    Ok(Json(state.catalog.list_hosts().await?))
}

async fn register_host(
    State(state): State<AppState>,
    Json(request): Json<RegisterHostRequest>,
) -> ApiResult<(StatusCode, Json<Host>)> {
    let host = state
        .catalog
        .register_host(&request.name, &request.url)
        .await?;
    Ok((StatusCode::CREATED, Json(host)))
}

async fn get_host(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Host>> {
    Ok(Json(state.catalog.get_host(&id).await?))
}
