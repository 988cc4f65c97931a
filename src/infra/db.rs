use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

pub type Db = sqlx::PgPool;

pub async fn connect() -> anyhow::Result<Db> {
    let url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL missing; set it to the PostgreSQL connection string")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .with_context(|| "failed to connect to database; check DATABASE_URL")?;
    Ok(pool)
}
