//! Activity log recording
//!
//! Recording never fails the calling request: storage errors are logged and
//! swallowed.

use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::ActivityLogConfig;
use crate::db::{ActivityLogRepository, DbPool};
use crate::models::{ActivityAction, ActivityLog, ActivityLogQuery, DbListResponse, NewActivityLog};

pub struct ActivityLogService {
    pool: DbPool,
    diff_for_tenants: HashSet<String>,
}

impl ActivityLogService {
    pub fn new(pool: DbPool, config: &ActivityLogConfig) -> Self {
        Self {
            pool,
            diff_for_tenants: config.diff_for_tenants.clone(),
        }
    }

    /// Store an entry, logging instead of failing on error
    pub async fn record(&self, tenant: &str, entry: NewActivityLog) -> Option<ActivityLog> {
        match ActivityLogRepository::new(&self.pool).insert(tenant, &entry).await {
            Ok(stored) => {
                debug!(
                    tenant = %tenant,
                    target_item = %stored.target_item,
                    action = stored.action.as_str(),
                    "Recorded activity"
                );
                Some(stored)
            }
            Err(e) => {
                warn!(
                    tenant = %tenant,
                    target_item = %entry.target_item,
                    error = %e,
                    "Failed to record activity log"
                );
                None
            }
        }
    }

    /// Store an EDITED entry, attaching a field diff for opted-in tenants
    pub async fn record_edit<T: Serialize>(
        &self,
        tenant: &str,
        mut entry: NewActivityLog,
        before: &T,
        after: &T,
    ) -> Option<ActivityLog> {
        if entry.action == ActivityAction::Edited && self.diff_for_tenants.contains(tenant) {
            match (serde_json::to_value(before), serde_json::to_value(after)) {
                (Ok(before), Ok(after)) => {
                    let changes = diff(&before, &after);
                    match entry.details {
                        Value::Object(ref mut details) => {
                            details.insert("diff".to_string(), changes);
                        }
                        _ => entry.details = json!({ "diff": changes }),
                    }
                }
                _ => warn!(tenant = %tenant, "Failed to serialize activity diff"),
            }
        }
        self.record(tenant, entry).await
    }

    pub async fn list(&self, tenant: &str, query: &ActivityLogQuery) -> Result<DbListResponse<ActivityLog>> {
        ActivityLogRepository::new(&self.pool).list(tenant, query).await
    }
}

/// `{field: {before, after}}` for every top-level field that changed
pub fn diff(before: &Value, after: &Value) -> Value {
    let empty = Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);

    let mut changes = Map::new();
    for key in before.keys().chain(after.keys()) {
        if changes.contains_key(key) {
            continue;
        }
        let old = before.get(key).unwrap_or(&Value::Null);
        let new = after.get(key).unwrap_or(&Value::Null);
        if old != new {
            changes.insert(key.clone(), json!({ "before": old, "after": new }));
        }
    }
    Value::Object(changes)
}
