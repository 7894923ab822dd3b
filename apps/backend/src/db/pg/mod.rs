use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Create a PostgreSQL connection pool and run migrations
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    // Run migrations automatically
    log::info!("Running PostgreSQL migrations...");
    sqlx::migrate!("./src/db/pg/migrations")
        .run(&pool)
        .await
        .context("Failed to run PostgreSQL migrations")?;
    log::info!("✅ PostgreSQL migrations complete");

    Ok(pool)
}
