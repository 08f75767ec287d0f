//! Playbook (runbook) models
//!
//! Every edit of a playbook's node graph creates a new revision linked to the
//! previous one; all revisions share a permanent id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runbook {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
    pub permanent_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub trigger_data: Option<Value>,
    #[serde(default)]
    pub ui_data: Option<Value>,
    #[serde(default)]
    pub settings: Option<Value>,
    /// Omitted from list responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create and update body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunbookPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub trigger_data: Option<Value>,
    #[serde(default)]
    pub ui_data: Option<Value>,
    #[serde(default)]
    pub settings: Option<Value>,
    /// When set, the node graph changed and a new revision is required
    #[serde(default)]
    pub nodes_dirty: Option<bool>,
}

impl RunbookPayload {
    /// Node graph carried in the UI data, if any
    pub fn nodes(&self) -> Option<Value> {
        self.ui_data.as_ref().and_then(|ui| ui.get("nodes")).cloned()
    }
}

/// In-place field changes to an existing revision
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunbookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

impl RunbookPatch {
    pub fn is_empty(&self) -> bool {
        *self == RunbookPatch::default()
    }

    /// Fields of `proposed` that are present and differ from `current`
    pub fn diff(current: &Runbook, proposed: &RunbookPayload) -> Self {
        fn changed<T: PartialEq + Clone>(current: Option<&T>, proposed: Option<&T>) -> Option<T> {
            match proposed {
                Some(p) if current != Some(p) => Some(p.clone()),
                _ => None,
            }
        }

        Self {
            name: changed(Some(&current.name), proposed.name.as_ref()),
            description: changed(current.description.as_ref(), proposed.description.as_ref()),
            enabled: changed(Some(&current.enabled), proposed.enabled.as_ref()),
            trigger_type: changed(current.trigger_type.as_ref(), proposed.trigger_type.as_ref()),
            trigger_data: changed(current.trigger_data.as_ref(), proposed.trigger_data.as_ref()),
            ui_data: changed(current.ui_data.as_ref(), proposed.ui_data.as_ref()),
            settings: changed(current.settings.as_ref(), proposed.settings.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunbookUpdateResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
    pub permanent_id: String,
    pub updated: bool,
}

/// Result of deleting every revision sharing a permanent id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunbookPermanentDeleteResponse {
    pub permanent_id: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RunbookQuery {
    pub partial_name: Option<String>,
    pub enabled: Option<bool>,
    pub trigger_type: Option<String>,
    pub runbook_ids: Vec<String>,
    pub permanent_ids: Vec<String>,
    pub only_latest_revision: bool,
    pub page: u32,
    pub page_size: u32,
}
