//! Preset routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::api::error::ApiResult;
use crate::api::models::CreatePresetRequest;
use crate::api::server::AppState;
use crate::database::models::Preset;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_presets).post(create_preset))
        .route("/{id}", get(get_preset).delete(delete_preset))
}

async fn list_presets(State(state): State<AppState>) -> ApiResult<Json<Vec<Preset>>> {
    Ok(Json(state.catalog.list_presets().await?))
}

async fn create_preset(
    State(state): State<AppState>,
    Json(request): Json<CreatePresetRequest>,
) -> ApiResult<(StatusCode, Json<Preset>)> {
    let parameters = request
        .parameters
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
    let preset = state.catalog.create_preset(&request.name, parameters).await?;
    Ok((StatusCode::CREATED, Json(preset)))
}

async fn get_preset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Preset>> {
    Ok(Json(state.catalog.get_preset(&id).await?))
}

async fn delete_preset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_preset(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
