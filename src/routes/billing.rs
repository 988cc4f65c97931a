use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::billing::CycleOutcome;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/billing/run", post(run_billing))
}

/// Manual trigger for administrators. Goes through the same `run_cycle` as
/// the scheduler.
async fn run_billing(State(state): State<Arc<AppState>>) -> Json<CycleOutcome> {
    info!("manual billing cycle triggered");
    Json(state.billing.run_cycle().await)
}
