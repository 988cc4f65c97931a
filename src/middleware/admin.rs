use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::domain::user::Role;
use crate::error::ApiError;
use crate::security::jwt::Claims;
use crate::state::AppState;
use crate::store::CredentialStore;

/// Second gate: runs after `auth_middleware`, so verified claims are already
/// in the extensions.
pub async fn admin_only(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(ApiError::Unauthenticated)?;
    require_role(state.users.as_ref(), &claims, Role::Admin).await?;
    Ok(next.run(req).await)
}

/// The role is looked up in the credential store at check time; the role
/// embedded in the token is never consulted, so a demotion takes effect on
/// the next request even while old tokens are still live.
pub async fn require_role(
    users: &dyn CredentialStore,
    claims: &Claims,
    required: Role,
) -> Result<(), ApiError> {
    let user_id: Uuid = claims.sub.parse().map_err(|_| ApiError::InvalidToken)?;
    let user = users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::internal)?;
    match user {
        Some(user) if user.role == required => Ok(()),
        Some(user) => {
            warn!(
                user_id = %user.id,
                username = %user.username,
                current_role = user.role.as_str(),
                required_role = required.as_str(),
                "role check refused"
            );
            Err(ApiError::Forbidden)
        }
        None => {
            warn!(user_id = %user_id, "role check for unknown user");
            Err(ApiError::Forbidden)
        }
    }
}
