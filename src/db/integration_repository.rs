//! Integration and ingestion tracker repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::placeholders;
use crate::models::Integration;

#[derive(Debug, sqlx::FromRow)]
struct IntegrationRow {
    id: String,
    application: String,
    name: String,
}

pub struct IntegrationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> IntegrationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, tenant: &str, integration: &Integration) -> Result<()> {
        sqlx::query(
            "INSERT INTO integrations (tenant, id, application, name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(tenant)
        .bind(&integration.id)
        .bind(&integration.application)
        .bind(&integration.name)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await
        .context("Failed to insert integration")?;
        Ok(())
    }

    /// Integrations of one application, restricted to `ids` when non-empty
    pub async fn list_by_application(
        &self,
        tenant: &str,
        application: &str,
        ids: &[String],
    ) -> Result<Vec<Integration>> {
        let mut sql = String::from(
            "SELECT id, application, name FROM integrations WHERE tenant = ? AND application = ?",
        );
        if !ids.is_empty() {
            sql.push_str(&format!(" AND id IN ({})", placeholders(ids.len())));
        }
        sql.push_str(" ORDER BY CAST(id AS INTEGER), id");

        let mut q = sqlx::query_as::<_, IntegrationRow>(&sql)
            .bind(tenant)
            .bind(application);
        for id in ids {
            q = q.bind(id);
        }
        let rows = q
            .fetch_all(self.pool)
            .await
            .context("Failed to list integrations")?;

        Ok(rows
            .into_iter()
            .map(|row| Integration {
                id: row.id,
                application: row.application,
                name: row.name,
            })
            .collect())
    }

    pub async fn latest_ingested_at(&self, tenant: &str, integration_id: &str) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT latest_ingested_at FROM integration_trackers WHERE tenant = ? AND integration_id = ?",
        )
        .bind(tenant)
        .bind(integration_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch integration tracker")
    }

    pub async fn upsert_tracker(
        &self,
        tenant: &str,
        integration_id: &str,
        latest_ingested_at: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO integration_trackers (tenant, integration_id, latest_ingested_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (tenant, integration_id) DO UPDATE SET
                latest_ingested_at = excluded.latest_ingested_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant)
        .bind(integration_id)
        .bind(latest_ingested_at)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await
        .context("Failed to update integration tracker")?;
        Ok(())
    }
}
