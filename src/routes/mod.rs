use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;

use crate::middleware::{admin, auth as auth_mw};
use crate::state::AppState;

mod auth;
mod billing;
mod catalog;
mod houses;

/// Three tiers: open (register/login), authenticated reads, and admin-gated
/// mutation plus the billing trigger. The admin tier stacks both gates;
/// authenticate runs first, then the live role check.
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let authed = Router::new()
        .merge(catalog::reads())
        .merge(houses::reads())
        .route_layer(from_fn_with_state(
            state.clone(),
            auth_mw::auth_middleware,
        ));

    let admin_only = Router::new()
        .merge(catalog::writes())
        .merge(houses::writes())
        .merge(billing::router())
        .route_layer(from_fn_with_state(state.clone(), admin::admin_only))
        .route_layer(from_fn_with_state(state, auth_mw::auth_middleware));

    Router::new()
        .merge(auth::router())
        .merge(authed)
        .merge(admin_only)
}
