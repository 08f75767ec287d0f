//! Product (workspace) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::TimeRange;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub integration_ids: Vec<i64>,
    pub immutable: bool,
    pub disabled: bool,
    pub bootstrapped: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create and update body
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub key: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub integration_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub immutable: Option<bool>,
    #[serde(default)]
    pub disabled: Option<bool>,
    #[serde(default)]
    pub bootstrapped: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub partial_name: Option<String>,
    pub product_ids: Vec<i64>,
    pub keys: Vec<String>,
    pub owner_ids: Vec<String>,
    pub immutable: Option<bool>,
    pub disabled: Option<bool>,
    pub updated_at: Option<TimeRange>,
    pub page: u32,
    pub page_size: u32,
}
