//! Typed per-domain report filters
//!
//! A [`ListRequest`] is resolved into one immutable filter value per
//! integration domain. Domains describe their list fields declaratively in a
//! [`ListField`] table; parsing, config-table overrides, record criteria and
//! cache hashing are all driven from that table.

pub mod criteria;
pub mod jira;
pub mod row_override;
pub mod salesforce;
pub mod sonarqube;
pub mod testrails;
pub mod zendesk;

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::{
    value_as_i64, value_as_string, value_as_string_list, AggInterval, ListRequest, TimeRange,
};

pub use criteria::{Criterion, PartialMatch};
pub use jira::JiraIssuesFilter;
pub use salesforce::SalesforceCaseFilter;
pub use sonarqube::SonarQubeIssueFilter;
pub use testrails::TestRailsTestFilter;
pub use zendesk::ZendeskTicketFilter;

/// Closed set of names accepted from requests
pub trait Named: Sized + Copy + Debug + PartialEq + Send + Sync + 'static {
    fn all() -> &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Case-insensitive lookup; unknown names give `None`
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(value))
    }

    /// Parse every value, dropping unknown ones
    fn parse_all(values: &[String]) -> Vec<Self> {
        values.iter().filter_map(|v| Self::parse(v)).collect()
    }
}

/// Declares a serde-friendly enum implementing [`Named`]
macro_rules! named_enum {
    ($(#[$meta:meta])* pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $crate::filters::Named for $name {
            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }
    };
}
pub(crate) use named_enum;

/// How an across dimension buckets records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Distinct values of a record field; `filter_key` is the list field
    /// narrowed to a bucket when stacking
    Field {
        record_field: &'static str,
        filter_key: Option<&'static str>,
    },
    /// Time buckets over an epoch-seconds record field
    Trend { time_field: &'static str },
}

pub trait Dimension: Named {
    fn grouping(&self) -> Grouping;

    fn is_trend(&self) -> bool {
        matches!(self.grouping(), Grouping::Trend { .. })
    }

    fn filter_key(&self) -> Option<&'static str> {
        match self.grouping() {
            Grouping::Field { filter_key, .. } => filter_key,
            Grouping::Trend { .. } => None,
        }
    }
}

/// What is computed per bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Count,
    /// min, max, median and sum over a numeric record field
    Field(&'static str),
    /// Same statistics over days elapsed since an epoch-seconds field
    AgeDays(&'static str),
}

pub trait Calculation: Named {
    fn metric(&self) -> Metric;
}

/// Hygiene criterion selecting records that need attention
pub trait Hygiene: Named {
    fn criteria(&self, now: i64) -> Vec<Criterion>;
}

pub const DAY_SECS: i64 = 86_400;
/// Records untouched for this many days are idle
pub const IDLE_DAYS: i64 = 30;
pub const POOR_DESCRIPTION_MIN_LEN: usize = 10;

pub fn range_criterion(field: &str, range: Option<TimeRange>) -> Option<Criterion> {
    range.map(|range| Criterion::Range {
        field: field.to_string(),
        range,
    })
}

/// Age in days as a range over a creation timestamp
pub fn age_criterion(field: &str, age: Option<TimeRange>, now: i64) -> Option<Criterion> {
    age.map(|age| Criterion::Range {
        field: field.to_string(),
        range: TimeRange {
            gt: age.lt.map(|days| now - days * DAY_SECS),
            lt: age.gt.map(|days| now - days * DAY_SECS),
        },
    })
}

pub fn idle_criterion(field: &str, now: i64) -> Criterion {
    Criterion::OlderThan {
        field: field.to_string(),
        cutoff: now - IDLE_DAYS * DAY_SECS,
    }
}

/// One list-valued filter field of a domain
pub struct ListField<F: 'static> {
    /// Request filter key, looked up as `prefix + key`
    pub key: &'static str,
    /// Config table column key able to override this field
    pub column: Option<&'static str>,
    /// Attribute of a stored record the field constrains
    pub record_field: &'static str,
    pub get: fn(&F) -> &Vec<String>,
    pub set: fn(&mut F, Vec<String>),
}

/// Builds a [`ListField`] entry for a `Vec<String>` struct field
macro_rules! list_field {
    ($key:literal, $column:expr, $record:literal, $field:ident) => {
        $crate::filters::ListField {
            key: $key,
            column: $column,
            record_field: $record,
            get: |f| &f.$field,
            set: |f, v| f.$field = v,
        }
    };
}
pub(crate) use list_field;

/// Fields shared by every domain filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseFilter {
    pub integration_ids: Vec<String>,
    pub ingested_at: Option<i64>,
    pub agg_interval: AggInterval,
    pub across_limit: Option<u32>,
    /// Excluded values keyed by unprefixed list field key
    pub excludes: BTreeMap<String, Vec<String>>,
    /// Partial matches keyed by field, prefix stripped
    pub partial_match: BTreeMap<String, PartialMatch>,
}

impl BaseFilter {
    pub fn from_request<F>(request: &ListRequest, prefix: &str, fields: &[ListField<F>]) -> Self {
        let excludes = request
            .filter_map("exclude")
            .map(|exclude| {
                fields
                    .iter()
                    .filter_map(|field| {
                        let values = exclude
                            .get(&format!("{prefix}{}", field.key))
                            .map(value_as_string_list)
                            .unwrap_or_default();
                        (!values.is_empty()).then(|| (field.key.to_string(), values))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let partial_match = request
            .filter_map("partial_match")
            .map(|partial| {
                partial
                    .iter()
                    .filter_map(|(key, value)| {
                        let key = key.strip_prefix(prefix)?;
                        Some((key.to_string(), PartialMatch::from_value(value)?))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            integration_ids: request.list_or_default("integration_ids"),
            ingested_at: request.filter.get("ingested_at").and_then(value_as_i64),
            agg_interval: AggInterval::parse_or_default(request.interval.as_deref()),
            across_limit: request.across_limit,
            excludes,
            partial_match,
        }
    }
}

/// A typed filter for one integration domain
pub trait DomainFilter: Clone + Debug + Default + Serialize + Send + Sync + 'static {
    type Across: Dimension;
    type Calc: Calculation;

    /// Path segment used in cache keys, e.g. `salesforce_cases`
    const DOMAIN: &'static str;
    /// Integration application whose ingestion snapshot the filter reads
    const APPLICATION: &'static str;
    const DEFAULT_ACROSS: Self::Across;
    const DEFAULT_CALCULATION: Self::Calc;

    fn list_fields() -> &'static [ListField<Self>];

    fn base(&self) -> &BaseFilter;
    fn base_mut(&mut self) -> &mut BaseFilter;

    fn across(&self) -> Option<Self::Across>;
    fn set_across(&mut self, across: Option<Self::Across>);

    fn calculation(&self) -> Self::Calc;
    fn set_calculation(&mut self, calculation: Option<Self::Calc>);

    /// Parse the non-list entries: time ranges, hygiene criteria, ...
    fn parse_extra(&mut self, request: &ListRequest, prefix: &str);

    /// Criteria contributed by the non-list entries
    fn extra_criteria(&self, now: i64) -> Vec<Criterion>;

    fn from_request(
        request: &ListRequest,
        prefix: &str,
        calculation: Option<Self::Calc>,
        across: Option<Self::Across>,
    ) -> Self {
        let mut filter = Self::default();
        for field in Self::list_fields() {
            (field.set)(&mut filter, request.list_or_default(&format!("{prefix}{}", field.key)));
        }
        *filter.base_mut() = BaseFilter::from_request(request, prefix, Self::list_fields());
        filter.set_across(across);
        filter.set_calculation(calculation);
        filter.parse_extra(request, prefix);
        filter
    }

    /// Base filter of the per-field `/values` lookups
    fn values_base(&self) -> Self {
        self.clone()
    }

    /// Copy with a different across
    fn with_across(&self, across: Option<Self::Across>) -> Self {
        let mut filter = self.clone();
        filter.set_across(across);
        filter
    }

    fn list_field(key: &str) -> Option<&'static ListField<Self>> {
        Self::list_fields().iter().find(|f| f.key == key)
    }

    /// Record predicates selecting the filter's records; all must hold
    fn criteria(&self, now: i64) -> Vec<Criterion> {
        let mut criteria = Vec::new();
        for field in Self::list_fields() {
            let values = (field.get)(self);
            if !values.is_empty() {
                criteria.push(Criterion::AnyOf {
                    field: field.record_field.to_string(),
                    values: values.clone(),
                });
            }
        }
        for (key, values) in &self.base().excludes {
            if let Some(field) = Self::list_field(key) {
                criteria.push(Criterion::NoneOf {
                    field: field.record_field.to_string(),
                    values: values.clone(),
                });
            }
        }
        for (key, pattern) in &self.base().partial_match {
            let record_field = Self::list_field(key).map_or(key.as_str(), |f| f.record_field);
            criteria.push(Criterion::Partial {
                field: record_field.to_string(),
                pattern: pattern.clone(),
            });
        }
        criteria.extend(self.extra_criteria(now));
        criteria
    }

    /// Stable hash of the filter's semantics, insensitive to list order
    fn cache_hash(&self) -> String {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        let canonical = canonicalize(value).to_string();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }
}

/// Sort arrays of scalars so equal filters hash equally
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut items: Vec<Value> = items.into_iter().map(canonicalize).collect();
            if items.iter().all(|v| !v.is_array() && !v.is_object()) {
                items.sort_by_key(|v| value_as_string(v).unwrap_or_default());
            }
            Value::Array(items)
        }
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect())
        }
        other => other,
    }
}
