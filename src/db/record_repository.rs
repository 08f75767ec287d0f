//! Ingested integration records

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::placeholders;

/// Latest snapshot of one ingested record
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub integration_id: String,
    pub record_id: String,
    pub ingested_at: i64,
    pub data: Value,
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    integration_id: String,
    record_id: String,
    ingested_at: i64,
    data: String,
}

pub struct RecordRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RecordRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        tenant: &str,
        domain: &str,
        integration_id: &str,
        record_id: &str,
        ingested_at: i64,
        data: &Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO integration_records (tenant, domain, integration_id, record_id, ingested_at, data)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tenant)
        .bind(domain)
        .bind(integration_id)
        .bind(record_id)
        .bind(ingested_at)
        .bind(data.to_string())
        .execute(self.pool)
        .await
        .context("Failed to insert integration record")?;
        Ok(())
    }

    /// Latest version of each record ingested at or before `ingested_at`
    pub async fn snapshot(
        &self,
        tenant: &str,
        domain: &str,
        integration_ids: &[String],
        ingested_at: Option<i64>,
    ) -> Result<Vec<StoredRecord>> {
        let mut sql = String::from(
            "SELECT integration_id, record_id, ingested_at, data FROM integration_records r \
             WHERE tenant = ? AND domain = ?",
        );
        if !integration_ids.is_empty() {
            sql.push_str(&format!(
                " AND integration_id IN ({})",
                placeholders(integration_ids.len())
            ));
        }
        if ingested_at.is_some() {
            sql.push_str(" AND ingested_at <= ?");
        }
        sql.push_str(
            " AND ingested_at = (SELECT MAX(i.ingested_at) FROM integration_records i \
             WHERE i.tenant = r.tenant AND i.domain = r.domain \
             AND i.integration_id = r.integration_id AND i.record_id = r.record_id",
        );
        if ingested_at.is_some() {
            sql.push_str(" AND i.ingested_at <= ?");
        }
        sql.push_str(") ORDER BY integration_id, record_id");

        let mut q = sqlx::query_as::<_, RecordRow>(&sql).bind(tenant).bind(domain);
        for id in integration_ids {
            q = q.bind(id);
        }
        if let Some(ts) = ingested_at {
            q = q.bind(ts).bind(ts);
        }
        let rows = q
            .fetch_all(self.pool)
            .await
            .context("Failed to load integration records")?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_str(&row.data) {
                Ok(data) => Some(StoredRecord {
                    integration_id: row.integration_id,
                    record_id: row.record_id,
                    ingested_at: row.ingested_at,
                    data,
                }),
                Err(e) => {
                    tracing::warn!("Skipping unreadable record {}: {}", row.record_id, e);
                    None
                }
            })
            .collect())
    }
}
