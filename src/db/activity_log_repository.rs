//! Activity log repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{page_bounds, parse_db_timestamp, placeholders};
use crate::models::{
    ActivityAction, ActivityLog, ActivityLogQuery, DbListResponse, NewActivityLog, TargetItemType,
};

#[derive(Debug, sqlx::FromRow)]
struct ActivityLogRow {
    id: String,
    target_item: String,
    email: String,
    target_item_type: String,
    action: String,
    body: String,
    details: String,
    created_at: String,
}

pub struct ActivityLogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ActivityLogRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, tenant: &str, entry: &NewActivityLog) -> Result<ActivityLog> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, tenant, target_item, email, target_item_type, action, body, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(tenant)
        .bind(&entry.target_item)
        .bind(&entry.email)
        .bind(entry.target_item_type.as_str())
        .bind(entry.action.as_str())
        .bind(&entry.body)
        .bind(entry.details.to_string())
        .bind(&created_at)
        .execute(self.pool)
        .await
        .context("Failed to insert activity log")?;

        Ok(ActivityLog {
            id,
            target_item: entry.target_item.clone(),
            email: entry.email.clone(),
            target_item_type: entry.target_item_type,
            action: entry.action,
            body: entry.body.clone(),
            details: entry.details.clone(),
            created_at: parse_db_timestamp(&created_at),
        })
    }

    pub async fn list(
        &self,
        tenant: &str,
        query: &ActivityLogQuery,
    ) -> Result<DbListResponse<ActivityLog>> {
        let mut conditions = String::from(" WHERE tenant = ?");
        if !query.target_items.is_empty() {
            conditions.push_str(&format!(
                " AND target_item IN ({})",
                placeholders(query.target_items.len())
            ));
        }
        if !query.target_item_types.is_empty() {
            conditions.push_str(&format!(
                " AND target_item_type IN ({})",
                placeholders(query.target_item_types.len())
            ));
        }
        if !query.actions.is_empty() {
            conditions.push_str(&format!(
                " AND action IN ({})",
                placeholders(query.actions.len())
            ));
        }
        if !query.emails.is_empty() {
            conditions.push_str(&format!(" AND email IN ({})", placeholders(query.emails.len())));
        }

        let mut binds: Vec<String> = vec![tenant.to_string()];
        binds.extend(query.target_items.iter().cloned());
        binds.extend(query.target_item_types.iter().map(|t| t.as_str().to_string()));
        binds.extend(query.actions.iter().map(|a| a.as_str().to_string()));
        binds.extend(query.emails.iter().cloned());

        let count_sql = format!("SELECT COUNT(*) FROM activity_logs{conditions}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count_query = count_query.bind(value);
        }
        let total: i64 = count_query
            .fetch_one(self.pool)
            .await
            .context("Failed to count activity logs")?;

        let sql = format!(
            "SELECT id, target_item, email, target_item_type, action, body, details, created_at \
             FROM activity_logs{conditions} ORDER BY created_at DESC LIMIT ? OFFSET ?"
        );
        let (limit, offset) = page_bounds(query.page, query.page_size);
        let mut q = sqlx::query_as::<_, ActivityLogRow>(&sql);
        for value in &binds {
            q = q.bind(value);
        }
        let rows = q
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .context("Failed to list activity logs")?;

        Ok(DbListResponse::of(
            rows.into_iter().filter_map(row_to_activity_log).collect(),
            total as usize,
        ))
    }
}

fn row_to_activity_log(row: ActivityLogRow) -> Option<ActivityLog> {
    let target_item_type = TargetItemType::parse(&row.target_item_type);
    let action = ActivityAction::parse(&row.action);
    if target_item_type.is_none() || action.is_none() {
        tracing::warn!("Skipping activity log {} with unknown type or action", row.id);
    }
    Some(ActivityLog {
        id: row.id,
        target_item: row.target_item,
        email: row.email,
        target_item_type: target_item_type?,
        action: action?,
        body: row.body,
        details: serde_json::from_str(&row.details).unwrap_or_default(),
        created_at: parse_db_timestamp(&row.created_at),
    })
}
