mod billing;
mod config;
mod domain;
mod error;
mod infra;
mod middleware;
mod routes;
mod security;
mod state;
mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billing::BillingEngine;
use config::AppConfig;
use infra::db::connect;
use security::jwt::JwtManager;
use store::postgres::{PgCredentialStore, PgPropertyCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = connect().await?;
    sqlx::migrate!().run(&db).await?;

    let catalog = Arc::new(PgPropertyCatalog::new(db.clone()));
    let users = Arc::new(PgCredentialStore::new(db));
    let jwt = JwtManager::from_env();
    let engine = BillingEngine::new(catalog.clone());
    let shared_state = state::AppState::new(catalog, users, jwt, engine.clone());

    tokio::spawn(billing::schedule::run_daily(engine));

    let app = Router::new()
        .merge(routes::router(shared_state.clone()))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let config = AppConfig::from_env();
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
