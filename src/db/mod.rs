//! Database layer
//!
//! SQLite storage for:
//! - Activity logs
//! - Config tables
//! - Integrations, ingestion trackers and ingested records
//! - Org units
//! - Playbooks and products

pub mod activity_log_repository;
pub mod config_table_repository;
pub mod integration_repository;
pub mod migrations;
pub mod org_unit_repository;
pub mod product_repository;
pub mod record_repository;
pub mod runbook_repository;

pub use activity_log_repository::ActivityLogRepository;
pub use config_table_repository::ConfigTableRepository;
pub use integration_repository::IntegrationRepository;
pub use org_unit_repository::OrgUnitRepository;
pub use product_repository::ProductRepository;
pub use record_repository::{RecordRepository, StoredRecord};
pub use runbook_repository::RunbookRepository;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    migrations::run(&pool).await?;

    Ok(pool)
}

pub(crate) fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

/// `?, ?, ?` for an `IN (...)` clause
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// LIMIT/OFFSET pair for a zero-based page
pub(crate) fn page_bounds(page: u32, page_size: u32) -> (i64, i64) {
    let size = page_size.max(1) as i64;
    (size, page as i64 * size)
}
