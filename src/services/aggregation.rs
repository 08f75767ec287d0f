//! Aggregation collaborators
//!
//! Report handlers talk to an [`AggregationService`] per domain. The default
//! implementation evaluates a filter's criteria against the latest snapshot of
//! ingested records and groups them in memory.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;

use crate::db::{DbPool, RecordRepository};
use crate::filters::criteria::{as_f64, scalars};
use crate::filters::{Calculation, Criterion, Dimension, DomainFilter, Grouping, Metric, DAY_SECS};
use crate::models::{AggInterval, AggregationResult, DbListResponse, SortEntry};

/// Bucket for records without a value in the grouped field
pub const UNKNOWN_KEY: &str = "_UNKNOWN_";

#[async_trait]
pub trait AggregationService<F: DomainFilter>: Send + Sync {
    /// Matching records, sorted and paginated
    async fn list(
        &self,
        tenant: &str,
        filter: &F,
        sort: &[SortEntry],
        page: u32,
        page_size: u32,
    ) -> Result<DbListResponse<Value>>;

    /// Group matching records by the filter's across and compute its calculation
    async fn group_by_and_calculate(
        &self,
        tenant: &str,
        filter: &F,
        context: Option<&str>,
    ) -> Result<DbListResponse<AggregationResult>>;

    /// Group by the filter's across, then by the first stack inside each bucket
    async fn stacked_group_by(
        &self,
        tenant: &str,
        filter: &F,
        stacks: &[F::Across],
        context: Option<&str>,
    ) -> Result<DbListResponse<AggregationResult>>;
}

/// Aggregation over the `integration_records` table
pub struct RecordAggregationService<F> {
    pool: DbPool,
    _filter: PhantomData<fn() -> F>,
}

impl<F> RecordAggregationService<F> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _filter: PhantomData,
        }
    }
}

impl<F: DomainFilter> RecordAggregationService<F> {
    async fn matching_records(&self, tenant: &str, filter: &F, now: i64) -> Result<Vec<Value>> {
        let base = filter.base();
        let records = RecordRepository::new(&self.pool)
            .snapshot(tenant, F::DOMAIN, &base.integration_ids, base.ingested_at)
            .await?;
        let criteria = filter.criteria(now);
        Ok(records
            .into_iter()
            .map(|r| r.data)
            .filter(|data| matches_all(&criteria, data))
            .collect())
    }
}

#[async_trait]
impl<F: DomainFilter> AggregationService<F> for RecordAggregationService<F> {
    async fn list(
        &self,
        tenant: &str,
        filter: &F,
        sort: &[SortEntry],
        page: u32,
        page_size: u32,
    ) -> Result<DbListResponse<Value>> {
        let mut records = self.matching_records(tenant, filter, Utc::now().timestamp()).await?;
        sort_records(&mut records, sort);
        let total = records.len();
        let start = (page as usize).saturating_mul(page_size as usize);
        let page_records = records
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();
        Ok(DbListResponse::of(page_records, total))
    }

    async fn group_by_and_calculate(
        &self,
        tenant: &str,
        filter: &F,
        context: Option<&str>,
    ) -> Result<DbListResponse<AggregationResult>> {
        let now = Utc::now().timestamp();
        let records = self.matching_records(tenant, filter, now).await?;
        Ok(DbListResponse::from_records(aggregate(&records, filter, context, now)))
    }

    async fn stacked_group_by(
        &self,
        tenant: &str,
        filter: &F,
        stacks: &[F::Across],
        context: Option<&str>,
    ) -> Result<DbListResponse<AggregationResult>> {
        let now = Utc::now().timestamp();
        let records = self.matching_records(tenant, filter, now).await?;
        let mut results = aggregate(&records, filter, context, now);

        if let Some(stack) = stacks.first().copied() {
            if context.is_none() {
                stack_buckets(&mut results, &records, filter, stack, now);
            }
        }
        Ok(DbListResponse::from_records(results))
    }
}

/// Nest a group-by on `stack` inside every across bucket
///
/// Trend dimensions on either side are left unstacked.
pub fn stack_buckets<F: DomainFilter>(
    results: &mut [AggregationResult],
    records: &[Value],
    filter: &F,
    stack: F::Across,
    now: i64,
) {
    let across = filter.across().unwrap_or(F::DEFAULT_ACROSS);
    if stack.is_trend() {
        return;
    }
    let Grouping::Field { record_field, .. } = across.grouping() else {
        return;
    };
    let Some(field) = across.filter_key().and_then(F::list_field) else {
        return;
    };

    let stacked = filter.with_across(Some(stack));
    for bucket in results.iter_mut() {
        // `_UNKNOWN_` holds records without a value; no value filter selects them
        let subset: Vec<Value> = if bucket.key == UNKNOWN_KEY {
            records
                .iter()
                .filter(|data| scalars(data.get(record_field)).is_empty())
                .cloned()
                .collect()
        } else {
            let mut narrowed = stacked.clone();
            (field.set)(&mut narrowed, vec![bucket.key.clone()]);
            let criteria = narrowed.criteria(now);
            records
                .iter()
                .filter(|data| matches_all(&criteria, data))
                .cloned()
                .collect()
        };
        bucket.stacks = Some(aggregate(&subset, &stacked, None, now));
    }
}

fn matches_all(criteria: &[Criterion], record: &Value) -> bool {
    criteria.iter().all(|c| c.matches(record))
}

/// Group `records` according to the filter's across and calculation
///
/// A `context` collapses all records into a single bucket keyed by it.
pub fn aggregate<F: DomainFilter>(
    records: &[Value],
    filter: &F,
    context: Option<&str>,
    now: i64,
) -> Vec<AggregationResult> {
    let metric = filter.calculation().metric();

    if let Some(context) = context {
        let all: Vec<&Value> = records.iter().collect();
        return vec![summarize(context.to_string(), None, &all, metric, now)];
    }

    let across = filter.across().unwrap_or(F::DEFAULT_ACROSS);
    let interval = filter.base().agg_interval;
    let mut buckets: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
    match across.grouping() {
        Grouping::Field { record_field, .. } => {
            for record in records {
                let keys = scalars(record.get(record_field));
                if keys.is_empty() {
                    buckets.entry(UNKNOWN_KEY.to_string()).or_default().push(record);
                }
                for key in keys {
                    buckets.entry(key).or_default().push(record);
                }
            }
        }
        Grouping::Trend { time_field } => {
            for record in records {
                if let Some(ts) = record.get(time_field).and_then(as_f64) {
                    let start = bucket_start(ts as i64, interval);
                    buckets.entry(start.to_string()).or_default().push(record);
                }
            }
        }
    }

    let mut results: Vec<AggregationResult> = buckets
        .into_iter()
        .map(|(key, members)| {
            let additional_key = if across.is_trend() {
                key.parse().ok().map(|start| bucket_label(start, interval))
            } else {
                None
            };
            summarize(key, additional_key, &members, metric, now)
        })
        .collect();

    if across.is_trend() {
        results.sort_by_key(|r| r.key.parse::<i64>().unwrap_or_default());
        return results;
    }

    match metric {
        Metric::Count => results.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))),
        Metric::Field(_) | Metric::AgeDays(_) => results.sort_by(|a, b| {
            cmp_f64(b.max, a.max).then_with(|| a.key.cmp(&b.key))
        }),
    }
    if let Some(limit) = filter.base().across_limit {
        results.truncate(limit as usize);
    }
    results
}

fn cmp_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::MIN)
        .partial_cmp(&b.unwrap_or(f64::MIN))
        .unwrap_or(Ordering::Equal)
}

fn summarize(
    key: String,
    additional_key: Option<String>,
    records: &[&Value],
    metric: Metric,
    now: i64,
) -> AggregationResult {
    let mut result = AggregationResult {
        key,
        additional_key,
        count: records.len() as u64,
        ..Default::default()
    };

    let mut values: Vec<f64> = match metric {
        Metric::Count => return result,
        Metric::Field(field) => records
            .iter()
            .filter_map(|r| r.get(field).and_then(as_f64))
            .collect(),
        Metric::AgeDays(field) => records
            .iter()
            .filter_map(|r| r.get(field).and_then(as_f64))
            .map(|created| ((now as f64 - created) / DAY_SECS as f64).floor())
            .collect(),
    };
    if values.is_empty() {
        return result;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    result.min = values.first().copied();
    result.max = values.last().copied();
    result.median = median(&values);
    result.sum = Some(values.iter().sum());
    result
}

/// Discrete median of sorted values
pub fn median(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let index = (sorted.len() + 1) / 2 - 1;
    sorted.get(index).copied()
}

/// Epoch seconds of the start of the interval containing `ts`
pub fn bucket_start(ts: i64, interval: AggInterval) -> i64 {
    let Some(dt) = DateTime::<Utc>::from_timestamp(ts, 0) else {
        return ts;
    };
    let date = dt.date_naive();
    let start = match interval {
        AggInterval::Day => Some(date),
        AggInterval::Week => {
            date.checked_sub_days(chrono::Days::new(date.weekday().num_days_from_monday() as u64))
        }
        AggInterval::Month => date.with_day(1),
        AggInterval::Quarter => chrono::NaiveDate::from_ymd_opt(
            date.year(),
            (date.month0() / 3) * 3 + 1,
            1,
        ),
        AggInterval::Year => chrono::NaiveDate::from_ymd_opt(date.year(), 1, 1),
    };
    start
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc().timestamp())
        .unwrap_or(ts)
}

/// Human readable name of a trend bucket
pub fn bucket_label(start: i64, interval: AggInterval) -> String {
    let Some(dt) = DateTime::<Utc>::from_timestamp(start, 0) else {
        return start.to_string();
    };
    match interval {
        AggInterval::Day => dt.format("%Y-%m-%d").to_string(),
        AggInterval::Week => {
            let week = dt.iso_week();
            format!("{}-{}", week.week(), week.year())
        }
        AggInterval::Month => format!("{}-{}", dt.month(), dt.year()),
        AggInterval::Quarter => format!("Q{}-{}", dt.month0() / 3 + 1, dt.year()),
        AggInterval::Year => dt.year().to_string(),
    }
}

fn sort_records(records: &mut [Value], sort: &[SortEntry]) {
    if sort.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        for entry in sort {
            let ordering = compare_values(a.get(&entry.id), b.get(&entry.id));
            let ordering = if entry.desc { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(as_f64), b.and_then(as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => {
            let x = scalars(a).join(",");
            let y = scalars(b).join(",");
            x.cmp(&y)
        }
    }
}
