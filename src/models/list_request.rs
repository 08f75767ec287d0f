//! Generic list/filter request envelope
//!
//! Every list and report endpoint accepts the same JSON body. The `filter`
//! map is deliberately loose: typed getters treat malformed entries as absent
//! instead of rejecting the request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Sort directive for list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub id: String,
    #[serde(default)]
    pub desc: bool,
}

/// Half-open time range expressed as `{"$gt": .., "$lt": ..}` epoch seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<i64>,
}

impl TimeRange {
    pub fn is_unbounded(&self) -> bool {
        self.gt.is_none() && self.lt.is_none()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.gt.map_or(true, |gt| value > gt) && self.lt.map_or(true, |lt| value < lt)
    }
}

/// List request body shared by every list and aggregation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub filter: Map<String, Value>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub sort: Vec<SortEntry>,
    #[serde(default)]
    pub across: Option<String>,
    #[serde(default)]
    pub across_limit: Option<u32>,
    /// Aggregation interval (`day`, `week`, ...)
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub stacks: Vec<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub ou_ids: Vec<String>,
    #[serde(default)]
    pub widget_id: Option<String>,
}

fn default_page_size() -> u32 {
    10
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            filter: Map::new(),
            page: 0,
            page_size: default_page_size(),
            sort: Vec::new(),
            across: None,
            across_limit: None,
            interval: None,
            stacks: Vec::new(),
            fields: Vec::new(),
            ou_ids: Vec::new(),
            widget_id: None,
        }
    }
}

impl ListRequest {
    /// Build a request around a filter map
    pub fn with_filter(filter: Map<String, Value>) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// `filter[key]` as a list of strings; absent or non-list values give `[]`
    pub fn list_or_default(&self, key: &str) -> Vec<String> {
        self.filter
            .get(key)
            .map(value_as_string_list)
            .unwrap_or_default()
    }

    /// `filter[key]` as a `{"$gt", "$lt"}` range
    pub fn time_range(&self, key: &str) -> Option<TimeRange> {
        let map = self.filter_map(key)?;
        let range = TimeRange {
            gt: map.get("$gt").and_then(value_as_i64),
            lt: map.get("$lt").and_then(value_as_i64),
        };
        (!range.is_unbounded()).then_some(range)
    }

    /// `filter[key]` as a string; numbers are stringified
    pub fn filter_str(&self, key: &str) -> Option<String> {
        self.filter.get(key).and_then(value_as_string)
    }

    /// `filter[key]` as a bool; accepts `true`/`false` strings
    pub fn filter_bool(&self, key: &str) -> Option<bool> {
        match self.filter.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn filter_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.filter.get(key).and_then(Value::as_object)
    }

    /// `filter.partial[key]` as a search term
    ///
    /// Accepts a plain string or a `{"$starts": ..}` / `{"$contains": ..}` map.
    pub fn partial_str(&self, key: &str) -> Option<String> {
        let value = self.filter_map("partial")?.get(key)?;
        let term = match value {
            Value::Object(map) => map
                .get("$starts")
                .or_else(|| map.get("$contains"))
                .and_then(value_as_string),
            other => value_as_string(other),
        }?;
        let term = term.trim();
        (!term.is_empty()).then(|| term.to_string())
    }

    /// SHA-256 hex digest of the serialized sort directives
    pub fn sort_hash(&self) -> String {
        let raw = serde_json::to_string(&self.sort).unwrap_or_default();
        hex::encode(Sha256::digest(raw.as_bytes()))
    }
}

/// Loose conversion of a JSON value to a list of strings
///
/// Scalars inside the list are stringified, nested containers are skipped.
pub fn value_as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_as_string).collect(),
        _ => Vec::new(),
    }
}

pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
