use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::property::{Neighborhood, Square};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::StoreError;

pub fn reads() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/neighborhoods", get(list_neighborhoods))
        .route("/api/neighborhoods/:id/squares", get(list_squares))
}

pub fn writes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/neighborhoods", post(create_neighborhood))
        .route("/api/squares", post(create_square))
}

async fn list_neighborhoods(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Neighborhood>>, ApiError> {
    Ok(Json(state.catalog.list_neighborhoods().await?))
}

#[derive(Deserialize)]
struct CreateNeighborhoodPayload {
    name: String,
}

async fn create_neighborhood(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateNeighborhoodPayload>,
) -> Result<(StatusCode, Json<Neighborhood>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required"));
    }
    let neighborhood = state
        .catalog
        .create_neighborhood(payload.name.trim())
        .await
        .map_err(|err| match err {
            StoreError::Duplicate => ApiError::Duplicate("Neighborhood name already exists"),
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(neighborhood)))
}

async fn list_squares(
    State(state): State<Arc<AppState>>,
    Path(neighborhood_id): Path<Uuid>,
) -> Result<Json<Vec<Square>>, ApiError> {
    Ok(Json(state.catalog.list_squares(neighborhood_id).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSquarePayload {
    name: String,
    neighborhood_id: Uuid,
}

async fn create_square(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSquarePayload>,
) -> Result<(StatusCode, Json<Square>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required"));
    }
    let square = state
        .catalog
        .create_square(payload.name.trim(), payload.neighborhood_id)
        .await?;
    Ok((StatusCode::CREATED, Json(square)))
}
