use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::security::jwt::{Claims, JwtManager, TokenError};
use crate::state::AppState;

/// First gate: a bearer credential must be present and verify. The verified
/// claims ride the request extensions for downstream gates and handlers.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state.jwt, bearer_from_headers(req.headers()))?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// An absent credential and an invalid one are distinct rejections: the
/// former never saw a token, the latter presented one that failed.
pub fn authenticate(jwt: &JwtManager, bearer: Option<String>) -> Result<Claims, ApiError> {
    let token = bearer.ok_or(ApiError::Unauthenticated)?;
    jwt.verify(&token).map_err(|err| match err {
        TokenError::Expired | TokenError::Invalid => ApiError::InvalidToken,
        TokenError::Sign(_) => ApiError::internal(err),
    })
}

pub fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}
