//! Config tables
//!
//! Tenant-authored lookup tables whose rows parameterize report filters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    /// Semantic key, e.g. `sf_priorities`
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub multi_value: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Keyed by column id
    #[serde(default)]
    pub columns: BTreeMap<String, Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    #[serde(default)]
    pub index: i64,
    /// Stored values keyed by column id
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigTable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub schema: Schema,
    /// Keyed by row id
    #[serde(default)]
    pub rows: BTreeMap<String, Row>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ConfigTable {
    /// Column whose key matches, case-insensitively
    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        self.schema
            .columns
            .values()
            .find(|c| c.key.eq_ignore_ascii_case(key))
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.values().find(|r| r.id == row_id)
    }

    /// Rows ordered by their index
    pub fn ordered_rows(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.rows.values().collect();
        rows.sort_by_key(|r| r.index);
        rows
    }
}

/// Summary returned by the config table list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigTableSummary {
    pub id: String,
    pub name: String,
    pub version: Option<String>,
    pub total_rows: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&ConfigTable> for ConfigTableSummary {
    fn from(table: &ConfigTable) -> Self {
        Self {
            id: table.id.clone(),
            name: table.name.clone(),
            version: table.version.clone(),
            total_rows: table.rows.len(),
            updated_at: table.updated_at,
        }
    }
}
