use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::user::Role;
use crate::error::ApiError;
use crate::security::password;
use crate::state::AppState;
use crate::store::StoreError;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

#[derive(Deserialize)]
struct RegisterPayload {
    username: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    message: &'static str,
    user_id: Uuid,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("Username and password are required"));
    }

    let hash = password::hash_password(&payload.password).map_err(ApiError::internal)?;
    let user = state
        .users
        .create_user(&payload.username, &hash, Role::Standard)
        .await
        .map_err(|err| match err {
            StoreError::Duplicate => ApiError::Duplicate("Username already exists"),
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully",
            user_id: user.id,
        }),
    ))
}

#[derive(Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user_id: Uuid,
    username: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("Username and password are required"));
    }

    let user = state
        .users
        .find_by_username(&payload.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid =
        password::verify_password(&payload.password, &user.password_hash).map_err(ApiError::internal)?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .jwt
        .issue(user.id, &user.username, user.role)
        .map_err(ApiError::internal)?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
    }))
}
