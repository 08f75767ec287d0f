//! Aggregation results

use serde::{Deserialize, Serialize};

/// Time bucket width for trend aggregations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggInterval {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl AggInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggInterval::Day => "day",
            AggInterval::Week => "week",
            AggInterval::Month => "month",
            AggInterval::Quarter => "quarter",
            AggInterval::Year => "year",
        }
    }

    /// Parse an interval name; unknown names fall back to `day`
    pub fn parse_or_default(value: Option<&str>) -> AggInterval {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("week") => AggInterval::Week,
            Some("month") => AggInterval::Month,
            Some("quarter") => AggInterval::Quarter,
            Some("year") => AggInterval::Year,
            _ => AggInterval::Day,
        }
    }
}

/// One bucket of a group-by
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_key: Option<String>,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks: Option<Vec<AggregationResult>>,
}

impl AggregationResult {
    pub fn count(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
            ..Default::default()
        }
    }
}
