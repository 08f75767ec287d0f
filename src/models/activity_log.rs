//! Activity log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of object an activity log entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetItemType {
    Product,
    Playbook,
    ConfigTable,
    Dashboard,
    Integration,
    Ticket,
    User,
}

impl TargetItemType {
    pub fn all() -> Vec<TargetItemType> {
        vec![
            TargetItemType::Product,
            TargetItemType::Playbook,
            TargetItemType::ConfigTable,
            TargetItemType::Dashboard,
            TargetItemType::Integration,
            TargetItemType::Ticket,
            TargetItemType::User,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetItemType::Product => "PRODUCT",
            TargetItemType::Playbook => "PLAYBOOK",
            TargetItemType::ConfigTable => "CONFIG_TABLE",
            TargetItemType::Dashboard => "DASHBOARD",
            TargetItemType::Integration => "INTEGRATION",
            TargetItemType::Ticket => "TICKET",
            TargetItemType::User => "USER",
        }
    }

    pub fn parse(value: &str) -> Option<TargetItemType> {
        Self::all()
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Created,
    Edited,
    Deleted,
    Success,
    Fail,
}

impl ActivityAction {
    pub fn all() -> Vec<ActivityAction> {
        vec![
            ActivityAction::Created,
            ActivityAction::Edited,
            ActivityAction::Deleted,
            ActivityAction::Success,
            ActivityAction::Fail,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "CREATED",
            ActivityAction::Edited => "EDITED",
            ActivityAction::Deleted => "DELETED",
            ActivityAction::Success => "SUCCESS",
            ActivityAction::Fail => "FAIL",
        }
    }

    /// Verb used in the human readable body
    pub fn verb(&self) -> &'static str {
        match self {
            ActivityAction::Created => "Created",
            ActivityAction::Edited => "Edited",
            ActivityAction::Deleted => "Deleted",
            ActivityAction::Success => "Succeeded",
            ActivityAction::Fail => "Failed",
        }
    }

    pub fn parse(value: &str) -> Option<ActivityAction> {
        Self::all()
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Stored activity log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: String,
    pub target_item: String,
    pub email: String,
    pub target_item_type: TargetItemType,
    pub action: ActivityAction,
    pub body: String,
    #[serde(default)]
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Entry to be recorded; id and timestamp are assigned on insert
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub target_item: String,
    pub email: String,
    pub target_item_type: TargetItemType,
    pub action: ActivityAction,
    pub body: String,
    pub details: serde_json::Value,
}

impl NewActivityLog {
    /// Entry with the standard `"{verb} {label}: {id}."` body
    pub fn new(
        target_item_type: TargetItemType,
        action: ActivityAction,
        label: &str,
        target_item: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let target_item = target_item.into();
        Self {
            body: format!("{} {}: {}.", action.verb(), label, target_item),
            target_item,
            email: email.into(),
            target_item_type,
            action,
            details: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Filter for the activity log list endpoint
#[derive(Debug, Clone, Default)]
pub struct ActivityLogQuery {
    pub target_items: Vec<String>,
    pub target_item_types: Vec<TargetItemType>,
    pub actions: Vec<ActivityAction>,
    pub emails: Vec<String>,
    pub page: u32,
    pub page_size: u32,
}
