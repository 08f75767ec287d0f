//! Playbook (runbook) repository

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};

use crate::db::{page_bounds, parse_db_timestamp, placeholders};
use crate::models::{DbListResponse, Runbook, RunbookPatch, RunbookQuery};

#[derive(Debug, sqlx::FromRow)]
struct RunbookRow {
    id: String,
    previous_id: Option<String>,
    permanent_id: String,
    name: String,
    description: Option<String>,
    enabled: bool,
    trigger_type: Option<String>,
    trigger_data: Option<String>,
    ui_data: Option<String>,
    settings: Option<String>,
    nodes: Option<String>,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str = "id, previous_id, permanent_id, name, description, enabled, trigger_type, \
                       trigger_data, ui_data, settings, nodes, created_at, updated_at";

const INSERT_SQL: &str = "INSERT INTO runbooks (tenant, id, previous_id, permanent_id, name, \
                          description, enabled, trigger_type, trigger_data, ui_data, settings, \
                          nodes, created_at, updated_at) \
                          VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

pub struct RunbookRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RunbookRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, tenant: &str, runbook: &Runbook) -> Result<()> {
        insert_query(tenant, runbook)
            .execute(self.pool)
            .await
            .context("Failed to insert playbook")?;
        Ok(())
    }

    /// Insert `revision` and disable `previous_id` in one transaction
    ///
    /// Returns false, persisting nothing, when `previous_id` no longer exists.
    pub async fn insert_revision(
        &self,
        tenant: &str,
        revision: &Runbook,
        previous_id: &str,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("Failed to start transaction")?;

        insert_query(tenant, revision)
            .execute(&mut *tx)
            .await
            .context("Failed to insert playbook revision")?;

        let disabled = sqlx::query(
            "UPDATE runbooks SET enabled = 0, updated_at = ? WHERE tenant = ? AND id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(tenant)
        .bind(previous_id)
        .execute(&mut *tx)
        .await
        .context("Failed to disable previous playbook revision")?;

        if disabled.rows_affected() == 0 {
            tx.rollback().await.context("Failed to roll back playbook revision")?;
            return Ok(false);
        }

        tx.commit().await.context("Failed to commit playbook revision")?;
        Ok(true)
    }

    pub async fn get(&self, tenant: &str, id: &str) -> Result<Option<Runbook>> {
        let row = sqlx::query_as::<_, RunbookRow>(&format!(
            "SELECT {COLUMNS} FROM runbooks WHERE tenant = ? AND id = ?"
        ))
        .bind(tenant)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch playbook")?;

        Ok(row.map(row_to_runbook))
    }

    pub async fn get_latest_by_permanent_id(
        &self,
        tenant: &str,
        permanent_id: &str,
    ) -> Result<Option<Runbook>> {
        let row = sqlx::query_as::<_, RunbookRow>(&format!(
            "SELECT {COLUMNS} FROM runbooks WHERE tenant = ? AND permanent_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT 1"
        ))
        .bind(tenant)
        .bind(permanent_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch latest playbook revision")?;

        Ok(row.map(row_to_runbook))
    }

    /// Id of the latest revision in the chain containing `id`
    pub async fn get_latest_revision_id(&self, tenant: &str, id: &str) -> Result<Option<String>> {
        let Some(runbook) = self.get(tenant, id).await? else {
            return Ok(None);
        };
        Ok(self
            .get_latest_by_permanent_id(tenant, &runbook.permanent_id)
            .await?
            .map(|latest| latest.id))
    }

    /// Persist the fields set in `patch`; false when no row was updated
    pub async fn update(&self, tenant: &str, id: &str, patch: &RunbookPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut binds: Vec<Option<String>> = Vec::new();
        if let Some(ref name) = patch.name {
            sets.push("name = ?");
            binds.push(Some(name.clone()));
        }
        if let Some(ref description) = patch.description {
            sets.push("description = ?");
            binds.push(Some(description.clone()));
        }
        if let Some(enabled) = patch.enabled {
            sets.push("enabled = ?");
            binds.push(Some(if enabled { "1" } else { "0" }.to_string()));
        }
        if let Some(ref trigger_type) = patch.trigger_type {
            sets.push("trigger_type = ?");
            binds.push(Some(trigger_type.clone()));
        }
        if let Some(ref trigger_data) = patch.trigger_data {
            sets.push("trigger_data = ?");
            binds.push(Some(trigger_data.to_string()));
        }
        if let Some(ref ui_data) = patch.ui_data {
            sets.push("ui_data = ?");
            binds.push(Some(ui_data.to_string()));
        }
        if let Some(ref settings) = patch.settings {
            sets.push("settings = ?");
            binds.push(Some(settings.to_string()));
        }
        sets.push("updated_at = ?");
        binds.push(Some(Utc::now().to_rfc3339()));

        let sql = format!(
            "UPDATE runbooks SET {} WHERE tenant = ? AND id = ?",
            sets.join(", ")
        );
        let mut q = sqlx::query(&sql);
        for value in binds {
            q = q.bind(value);
        }
        let result = q
            .bind(tenant)
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to update playbook")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a revision together with all of its predecessors
    ///
    /// Returns false when `id` does not exist.
    pub async fn delete_with_previous_revisions(&self, tenant: &str, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("Failed to start transaction")?;

        let mut ids = Vec::new();
        let mut next = Some(id.to_string());
        while let Some(current) = next.take() {
            if ids.contains(&current) {
                break;
            }
            let previous: Option<Option<String>> = sqlx::query_scalar(
                "SELECT previous_id FROM runbooks WHERE tenant = ? AND id = ?",
            )
            .bind(tenant)
            .bind(&current)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to walk playbook revisions")?;
            let Some(previous) = previous else {
                break;
            };
            ids.push(current);
            next = previous;
        }

        if ids.is_empty() {
            return Ok(false);
        }

        let sql = format!(
            "DELETE FROM runbooks WHERE tenant = ? AND id IN ({})",
            placeholders(ids.len())
        );
        let mut q = sqlx::query(&sql).bind(tenant);
        for revision in &ids {
            q = q.bind(revision);
        }
        q.execute(&mut *tx)
            .await
            .context("Failed to delete playbook revisions")?;

        tx.commit().await.context("Failed to commit playbook delete")?;
        Ok(true)
    }

    pub async fn list(&self, tenant: &str, query: &RunbookQuery) -> Result<DbListResponse<Runbook>> {
        let mut conditions = String::from(" WHERE r.tenant = ?");
        let mut binds: Vec<String> = vec![tenant.to_string()];

        if let Some(ref name) = query.partial_name {
            conditions.push_str(" AND LOWER(r.name) LIKE ?");
            binds.push(format!("%{}%", name.to_lowercase()));
        }
        if let Some(enabled) = query.enabled {
            conditions.push_str(" AND r.enabled = ?");
            binds.push(if enabled { "1" } else { "0" }.to_string());
        }
        if let Some(ref trigger_type) = query.trigger_type {
            conditions.push_str(" AND r.trigger_type = ?");
            binds.push(trigger_type.clone());
        }
        if !query.runbook_ids.is_empty() {
            conditions.push_str(&format!(" AND r.id IN ({})", placeholders(query.runbook_ids.len())));
            binds.extend(query.runbook_ids.iter().cloned());
        }
        if !query.permanent_ids.is_empty() {
            conditions.push_str(&format!(
                " AND r.permanent_id IN ({})",
                placeholders(query.permanent_ids.len())
            ));
            binds.extend(query.permanent_ids.iter().cloned());
        }
        if query.only_latest_revision {
            conditions.push_str(
                " AND NOT EXISTS (SELECT 1 FROM runbooks n WHERE n.tenant = r.tenant AND n.previous_id = r.id)",
            );
        }

        let count_sql = format!("SELECT COUNT(*) FROM runbooks r{conditions}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count_query = count_query.bind(value);
        }
        let total = count_query
            .fetch_one(self.pool)
            .await
            .context("Failed to count playbooks")?;

        let columns = COLUMNS
            .split(", ")
            .map(|c| format!("r.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {columns} FROM runbooks r{conditions} ORDER BY r.updated_at DESC LIMIT ? OFFSET ?"
        );
        let (limit, offset) = page_bounds(query.page, query.page_size);
        let mut q = sqlx::query_as::<_, RunbookRow>(&sql);
        for value in &binds {
            q = q.bind(value);
        }
        let rows = q
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .context("Failed to list playbooks")?;

        Ok(DbListResponse::of(
            rows.into_iter().map(row_to_runbook).collect(),
            total as usize,
        ))
    }
}

fn parse_json(raw: Option<String>) -> Option<Value> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

fn insert_query<'q>(tenant: &'q str, runbook: &'q Runbook) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    sqlx::query(INSERT_SQL)
        .bind(tenant)
        .bind(&runbook.id)
        .bind(&runbook.previous_id)
        .bind(&runbook.permanent_id)
        .bind(&runbook.name)
        .bind(&runbook.description)
        .bind(runbook.enabled)
        .bind(&runbook.trigger_type)
        .bind(runbook.trigger_data.as_ref().map(Value::to_string))
        .bind(runbook.ui_data.as_ref().map(Value::to_string))
        .bind(runbook.settings.as_ref().map(Value::to_string))
        .bind(runbook.nodes.as_ref().map(Value::to_string))
        .bind(runbook.created_at.to_rfc3339())
        .bind(runbook.updated_at.to_rfc3339())
}

fn row_to_runbook(row: RunbookRow) -> Runbook {
    Runbook {
        id: row.id,
        previous_id: row.previous_id,
        permanent_id: row.permanent_id,
        name: row.name,
        description: row.description,
        enabled: row.enabled,
        trigger_type: row.trigger_type,
        trigger_data: parse_json(row.trigger_data),
        ui_data: parse_json(row.ui_data),
        settings: parse_json(row.settings),
        nodes: parse_json(row.nodes),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
