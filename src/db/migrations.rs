//! Database migrations
//!
//! Migrations are handled by SQLx and stored in the `migrations/` directory.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

/// Apply pending migrations
pub async fn run(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")
}

/// Check that the database answers queries
pub async fn check_connection(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Database did not answer")?;
    Ok(())
}
