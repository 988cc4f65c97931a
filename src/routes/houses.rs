use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::property::{House, PaymentType};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{HouseUpdate, NewHouse, StoreError};

pub fn reads() -> Router<Arc<AppState>> {
    Router::new().route("/api/squares/:id/houses", get(list_houses))
}

pub fn writes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/houses", post(create_house))
        .route("/api/houses/:id", put(update_house))
        .route("/api/houses/:id", delete(delete_house))
}

async fn list_houses(
    State(state): State<Arc<AppState>>,
    Path(square_id): Path<Uuid>,
) -> Result<Json<Vec<House>>, ApiError> {
    Ok(Json(state.catalog.list_houses(square_id).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateHousePayload {
    house_number: String,
    owner_name: String,
    owner_phone: Option<String>,
    is_occupied: Option<bool>,
    has_paid: Option<bool>,
    payment_type: Option<PaymentType>,
    required_amount: Option<i64>,
    receipt_image: Option<String>,
    square_id: Uuid,
}

async fn create_house(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateHousePayload>,
) -> Result<(StatusCode, Json<House>), ApiError> {
    if payload.house_number.trim().is_empty() {
        return Err(ApiError::BadRequest("House number is required"));
    }

    let taken = state
        .catalog
        .house_number_taken(payload.square_id, payload.house_number.trim(), None)
        .await?;
    if taken {
        return Err(ApiError::Duplicate(
            "House number already exists in this square",
        ));
    }

    let payment_type = payload.payment_type.unwrap_or(PaymentType::SmallMeter);
    let house = state
        .catalog
        .create_house(NewHouse {
            house_number: payload.house_number.trim().to_string(),
            owner_name: payload.owner_name,
            owner_phone: payload.owner_phone,
            is_occupied: payload.is_occupied.unwrap_or(true),
            has_paid: payload.has_paid.unwrap_or(false),
            payment_type,
            required_amount: payload
                .required_amount
                .unwrap_or_else(|| payment_type.required_amount()),
            receipt_image: payload.receipt_image,
            square_id: payload.square_id,
        })
        .await
        .map_err(|err| match err {
            // Lost the race between the pre-check and the insert.
            StoreError::Duplicate => {
                ApiError::Duplicate("House number already exists in this square")
            }
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(house)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateHousePayload {
    house_number: Option<String>,
    owner_name: Option<String>,
    owner_phone: Option<Option<String>>,
    is_occupied: Option<bool>,
    has_paid: Option<bool>,
    payment_type: Option<PaymentType>,
    required_amount: Option<i64>,
    receipt_image: Option<Option<String>>,
}

async fn update_house(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateHousePayload>,
) -> Result<Json<House>, ApiError> {
    let current = state
        .catalog
        .find_house(id)
        .await?
        .ok_or(ApiError::NotFound("House"))?;

    if let Some(number) = payload.house_number.as_deref() {
        let taken = state
            .catalog
            .house_number_taken(current.square_id, number.trim(), Some(id))
            .await?;
        if taken {
            return Err(ApiError::Duplicate(
                "House number already exists in this square",
            ));
        }
    }

    state
        .catalog
        .update_house(
            id,
            HouseUpdate {
                house_number: payload.house_number.map(|n| n.trim().to_string()),
                owner_name: payload.owner_name,
                owner_phone: payload.owner_phone,
                is_occupied: payload.is_occupied,
                has_paid: payload.has_paid,
                payment_type: payload.payment_type,
                required_amount: payload.required_amount,
                last_payment_date: None,
                receipt_image: payload.receipt_image,
            },
        )
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::NotFound("House"),
            other => other.into(),
        })?;

    let updated = state
        .catalog
        .find_house(id)
        .await?
        .ok_or(ApiError::NotFound("House"))?;
    Ok(Json(updated))
}

#[derive(Serialize)]
struct DeleteResponse {
    message: &'static str,
}

async fn delete_house(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.catalog.delete_house(id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::NotFound("House"),
        other => other.into(),
    })?;
    Ok(Json(DeleteResponse {
        message: "House deleted successfully",
    }))
}
