//! Provisions the bootstrap ADMIN account and a sample district hierarchy.
//! Safe to run repeatedly; existing records are left alone.

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL missing; set it to the PostgreSQL connection string")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .with_context(|| "failed to connect to database; check DATABASE_URL")?;
    sqlx::migrate!().run(&pool).await?;

    seed_admin(&pool).await?;
    seed_districts(&pool).await?;

    info!("seeding finished");
    Ok(())
}

async fn seed_admin(pool: &PgPool) -> anyhow::Result<()> {
    let password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hash failed: {e}"))?
        .to_string();

    let inserted = sqlx::query(
        "INSERT INTO users (id, username, password_hash, role, created_at)
         VALUES ($1, 'admin', $2, 'ADMIN', now())
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(&hash)
    .execute(pool)
    .await?;

    if inserted.rows_affected() > 0 {
        info!("created default admin user");
    } else {
        info!("admin user already present");
    }
    Ok(())
}

async fn seed_districts(pool: &PgPool) -> anyhow::Result<()> {
    let neighborhoods = [
        "North District",
        "South District",
        "East District",
        "West District",
        "Central District",
    ];
    let squares = ["First Square", "Second Square", "Third Square"];

    for name in neighborhoods {
        let neighborhood_id: Uuid = match sqlx::query(
            "INSERT INTO neighborhoods (id, name) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_optional(pool)
        .await?
        {
            Some(row) => {
                info!(neighborhood = name, "created neighborhood");
                row.get("id")
            }
            None => sqlx::query("SELECT id FROM neighborhoods WHERE name = $1")
                .bind(name)
                .fetch_one(pool)
                .await?
                .get("id"),
        };

        for square in squares {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM squares WHERE name = $1 AND neighborhood_id = $2)",
            )
            .bind(square)
            .bind(neighborhood_id)
            .fetch_one(pool)
            .await?;
            if exists {
                continue;
            }
            sqlx::query("INSERT INTO squares (id, name, neighborhood_id) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(square)
                .bind(neighborhood_id)
                .execute(pool)
                .await?;
            info!(neighborhood = name, square, "created square");
        }
    }
    Ok(())
}
