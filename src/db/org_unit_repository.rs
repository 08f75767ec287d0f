//! Org unit repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::OrgUnit;

#[derive(Debug, sqlx::FromRow)]
struct OrgUnitRow {
    id: String,
    name: String,
    integration_ids: String,
    default_filters: String,
}

pub struct OrgUnitRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrgUnitRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, tenant: &str, id: &str) -> Result<Option<OrgUnit>> {
        let row = sqlx::query_as::<_, OrgUnitRow>(
            "SELECT id, name, integration_ids, default_filters FROM org_units WHERE tenant = ? AND id = ?",
        )
        .bind(tenant)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch org unit")?;

        row.map(|row| -> Result<OrgUnit> {
            Ok(OrgUnit {
                id: row.id,
                name: row.name,
                integration_ids: serde_json::from_str(&row.integration_ids)
                    .context("Corrupt org unit integration ids")?,
                default_filters: serde_json::from_str(&row.default_filters)
                    .context("Corrupt org unit default filters")?,
            })
        })
        .transpose()
    }

    pub async fn insert(&self, tenant: &str, unit: &OrgUnit) -> Result<()> {
        sqlx::query(
            "INSERT INTO org_units (tenant, id, name, integration_ids, default_filters) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(tenant)
        .bind(&unit.id)
        .bind(&unit.name)
        .bind(serde_json::to_string(&unit.integration_ids)?)
        .bind(serde_json::to_string(&unit.default_filters)?)
        .execute(self.pool)
        .await
        .context("Failed to insert org unit")?;
        Ok(())
    }
}
