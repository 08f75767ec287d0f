//! Record predicates evaluated by the record aggregation engine

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{value_as_i64, value_as_string, TimeRange};

/// `{"$begins": .., "$ends": .., "$contains": ..}`; a bare string means contains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMatch {
    #[serde(rename = "$begins", default, skip_serializing_if = "Option::is_none")]
    pub begins: Option<String>,
    #[serde(rename = "$ends", default, skip_serializing_if = "Option::is_none")]
    pub ends: Option<String>,
    #[serde(rename = "$contains", default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

impl PartialMatch {
    pub fn from_value(value: &Value) -> Option<Self> {
        let pattern = match value {
            Value::String(s) => PartialMatch {
                contains: Some(s.clone()),
                ..Default::default()
            },
            Value::Object(map) => PartialMatch {
                begins: map.get("$begins").and_then(value_as_string),
                ends: map.get("$ends").and_then(value_as_string),
                contains: map.get("$contains").and_then(value_as_string),
            },
            _ => return None,
        };
        (pattern != PartialMatch::default()).then_some(pattern)
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.begins
            .as_ref()
            .map_or(true, |p| text.starts_with(&p.to_lowercase()))
            && self
                .ends
                .as_ref()
                .map_or(true, |p| text.ends_with(&p.to_lowercase()))
            && self
                .contains
                .as_ref()
                .map_or(true, |p| text.contains(&p.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Field value, or any element of an array value, is one of `values`
    AnyOf { field: String, values: Vec<String> },
    /// No element of the field value is one of `values`
    NoneOf { field: String, values: Vec<String> },
    Partial { field: String, pattern: PartialMatch },
    /// Epoch-seconds field inside the exclusive range
    Range { field: String, range: TimeRange },
    /// Field absent, null, blank or an empty array
    Missing { field: String },
    /// Epoch-seconds field strictly before `cutoff`
    OlderThan { field: String, cutoff: i64 },
    /// Text field shorter than `min_len` characters, or missing
    ShorterThan { field: String, min_len: usize },
    /// Numeric field at least `min`
    AtLeast { field: String, min: f64 },
}

impl Criterion {
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Criterion::AnyOf { field, values } => {
                scalars(record.get(field)).iter().any(|v| values.contains(v))
            }
            Criterion::NoneOf { field, values } => {
                !scalars(record.get(field)).iter().any(|v| values.contains(v))
            }
            Criterion::Partial { field, pattern } => scalars(record.get(field))
                .iter()
                .any(|v| pattern.matches(v)),
            Criterion::Range { field, range } => record
                .get(field)
                .and_then(value_as_i64)
                .is_some_and(|v| range.contains(v)),
            Criterion::Missing { field } => scalars(record.get(field))
                .iter()
                .all(|v| v.trim().is_empty()),
            Criterion::OlderThan { field, cutoff } => record
                .get(field)
                .and_then(value_as_i64)
                .is_some_and(|v| v < *cutoff),
            Criterion::ShorterThan { field, min_len } => record
                .get(field)
                .and_then(Value::as_str)
                .map_or(true, |s| s.trim().chars().count() < *min_len),
            Criterion::AtLeast { field, min } => record
                .get(field)
                .and_then(as_f64)
                .is_some_and(|v| v >= *min),
        }
    }
}

/// Scalar or array value flattened to strings
pub fn scalars(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(value_as_string).collect(),
        Some(v) => value_as_string(v).into_iter().collect(),
        None => Vec::new(),
    }
}

pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
