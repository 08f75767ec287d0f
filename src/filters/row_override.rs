//! Config-table row overrides
//!
//! A config table row narrows a parsed filter: each column whose key matches
//! a domain list field replaces that field with the intersection of the row's
//! values and the request's values.

use std::collections::BTreeMap;

use crate::filters::DomainFilter;
use crate::models::{Column, Row};

/// Values stored in `row` for `column`
pub fn row_value(row: &Row, column: &Column) -> Vec<String> {
    let Some(raw) = row.values.get(&column.id) else {
        return Vec::new();
    };
    if !column.multi_value {
        return if raw.is_empty() {
            Vec::new()
        } else {
            vec![raw.clone()]
        };
    }
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let entries = match serde_json::from_str::<Vec<String>>(raw) {
        Ok(values) => values,
        Err(_) => legacy_decode(raw),
    };
    entries
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// `[a, "b",c]` style values written by older clients
fn legacy_decode(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(']').unwrap_or(trimmed);
    trimmed
        .replace('"', "")
        .split(',')
        .map(str::to_string)
        .collect()
}

/// Row values constrained by the request's values
///
/// An empty side imposes no constraint. Otherwise the result keeps row order
/// without duplicates.
pub fn intersect(row_values: &[String], filter_values: &[String]) -> Vec<String> {
    if row_values.is_empty() {
        return filter_values.to_vec();
    }
    if filter_values.is_empty() {
        return row_values.to_vec();
    }
    let mut result: Vec<String> = Vec::new();
    for value in row_values {
        if filter_values.contains(value) && !result.contains(value) {
            result.push(value.clone());
        }
    }
    result
}

/// Copy of `filter` narrowed by `row`; unknown column keys are ignored
pub fn apply_row<F: DomainFilter>(filter: &F, columns: &BTreeMap<String, Column>, row: &Row) -> F {
    let mut updated = filter.clone();
    for column in columns.values() {
        let Some(field) = F::list_fields()
            .iter()
            .find(|f| f.column == Some(column.key.as_str()))
        else {
            continue;
        };
        let narrowed = intersect(&row_value(row, column), (field.get)(&updated));
        (field.set)(&mut updated, narrowed);
    }
    updated
}

/// Schema and row holding one cell per `(column key, multi value, raw value)`
#[cfg(test)]
pub(crate) fn single_row_table(cells: &[(&str, bool, &str)]) -> (BTreeMap<String, Column>, Row) {
    let columns = cells
        .iter()
        .map(|(key, multi_value, _)| {
            let column = Column {
                id: format!("col-{key}"),
                key: key.to_string(),
                display_name: None,
                multi_value: *multi_value,
            };
            (key.to_string(), column)
        })
        .collect();
    let row = Row {
        id: "row-1".to_string(),
        index: 1,
        values: cells
            .iter()
            .map(|(key, _, raw)| (format!("col-{key}"), raw.to_string()))
            .collect(),
    };
    (columns, row)
}
