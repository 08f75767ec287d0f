//! Config table repository

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::parse_db_timestamp;
use crate::models::{ConfigTable, Row, Schema};

#[derive(Debug, sqlx::FromRow)]
struct ConfigTableRow {
    id: String,
    name: String,
    version: Option<String>,
    schema_json: String,
    rows_json: String,
    created_by: Option<String>,
    updated_at: String,
}

pub struct ConfigTableRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ConfigTableRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, tenant: &str, id: &str) -> Result<Option<ConfigTable>> {
        let row = sqlx::query_as::<_, ConfigTableRow>(
            "SELECT id, name, version, schema_json, rows_json, created_by, updated_at FROM config_tables WHERE tenant = ? AND id = ?",
        )
        .bind(tenant)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch config table")?;

        row.map(row_to_config_table).transpose()
    }

    pub async fn list(&self, tenant: &str) -> Result<Vec<ConfigTable>> {
        let rows = sqlx::query_as::<_, ConfigTableRow>(
            "SELECT id, name, version, schema_json, rows_json, created_by, updated_at FROM config_tables WHERE tenant = ? ORDER BY name",
        )
        .bind(tenant)
        .fetch_all(self.pool)
        .await
        .context("Failed to list config tables")?;

        rows.into_iter().map(row_to_config_table).collect()
    }

    /// Insert or replace a table
    pub async fn upsert(&self, tenant: &str, table: &ConfigTable) -> Result<()> {
        let schema = serde_json::to_string(&table.schema).context("Failed to encode schema")?;
        let rows = serde_json::to_string(&table.rows).context("Failed to encode rows")?;
        let updated_at = table.updated_at.unwrap_or_else(Utc::now).to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO config_tables (tenant, id, name, version, schema_json, rows_json, created_by, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (tenant, id) DO UPDATE SET
                name = excluded.name,
                version = excluded.version,
                schema_json = excluded.schema_json,
                rows_json = excluded.rows_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant)
        .bind(&table.id)
        .bind(&table.name)
        .bind(&table.version)
        .bind(schema)
        .bind(rows)
        .bind(&table.created_by)
        .bind(updated_at)
        .execute(self.pool)
        .await
        .context("Failed to store config table")?;

        Ok(())
    }
}

fn row_to_config_table(row: ConfigTableRow) -> Result<ConfigTable> {
    let schema: Schema =
        serde_json::from_str(&row.schema_json).context("Corrupt config table schema")?;
    let rows: BTreeMap<String, Row> =
        serde_json::from_str(&row.rows_json).context("Corrupt config table rows")?;
    Ok(ConfigTable {
        id: row.id,
        name: row.name,
        version: row.version,
        schema,
        rows,
        created_by: row.created_by,
        updated_at: Some(parse_db_timestamp(&row.updated_at)),
    })
}
