//! Test fixtures for common test data
//!
//! Fixtures provide pre-defined test data that can be used across multiple tests.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use sei_api::{
    db::RecordRepository,
    models::{Column, ConfigTable, Row, Schema},
    AppState,
};

/// Fixed ids for testing (reproducible tests)
pub mod ids {
    pub const TEAMS_TABLE_ID: &str = "5b0e1a0c-3b8e-4c1e-9a53-0f6f3f7d2a11";
    pub const MISSING_TABLE_ID: &str = "00000000-0000-4000-8000-000000000000";
    pub const TEAM_COLUMN_ID: &str = "col-team";
    pub const PRIORITY_COLUMN_ID: &str = "col-priorities";
    pub const STATUS_COLUMN_ID: &str = "col-status";
}

/// Config table fixtures
pub struct ConfigTableFixtures;

impl ConfigTableFixtures {
    /// Two team rows, each overriding the Salesforce priorities
    ///
    /// | team   | sf_priorities     | status (single) |
    /// |--------|-------------------|-----------------|
    /// | alpha  | ["high","urgent"] | open            |
    /// | beta   | low               | closed          |
    pub fn teams() -> ConfigTable {
        let columns = BTreeMap::from([
            column(ids::TEAM_COLUMN_ID, "team", false),
            column(ids::PRIORITY_COLUMN_ID, "sf_priorities", true),
            column(ids::STATUS_COLUMN_ID, "status", false),
        ]);

        let rows = BTreeMap::from([
            row("r-alpha", 1, &[
                (ids::TEAM_COLUMN_ID, "alpha"),
                (ids::PRIORITY_COLUMN_ID, r#"["high","urgent"]"#),
                (ids::STATUS_COLUMN_ID, "open"),
            ]),
            row("r-beta", 2, &[
                (ids::TEAM_COLUMN_ID, "beta"),
                (ids::PRIORITY_COLUMN_ID, "low"),
                (ids::STATUS_COLUMN_ID, "closed"),
            ]),
        ]);

        ConfigTable {
            id: ids::TEAMS_TABLE_ID.to_string(),
            name: "teams".to_string(),
            version: Some("1".to_string()),
            schema: Schema { columns },
            rows,
            created_by: Some("fixtures@acme.io".to_string()),
            updated_at: None,
        }
    }

    /// Same table with the across column flagged as multi-valued
    pub fn teams_with_multi_value_status() -> ConfigTable {
        let mut table = Self::teams();
        if let Some(column) = table.schema.columns.get_mut(ids::STATUS_COLUMN_ID) {
            column.multi_value = true;
        }
        table
    }
}

fn column(id: &str, key: &str, multi_value: bool) -> (String, Column) {
    (
        id.to_string(),
        Column {
            id: id.to_string(),
            key: key.to_string(),
            display_name: None,
            multi_value,
        },
    )
}

fn row(id: &str, index: i64, values: &[(&str, &str)]) -> (String, Row) {
    (
        id.to_string(),
        Row {
            id: id.to_string(),
            index,
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        },
    )
}

/// Store a config table for `tenant`
pub async fn seed_config_table(state: &AppState, tenant: &str, table: &ConfigTable) {
    state
        .config_tables
        .save(tenant, table)
        .await
        .expect("Failed to seed config table");
}

/// Store one ingested record for `domain`
pub async fn seed_record(
    state: &AppState,
    tenant: &str,
    domain: &str,
    record_id: &str,
    ingested_at: i64,
    data: Value,
) {
    RecordRepository::new(&state.db)
        .insert(tenant, domain, "1", record_id, ingested_at, &data)
        .await
        .expect("Failed to seed record");
}

/// Salesforce case record
pub fn salesforce_case(case_id: &str, priority: &str, status: &str) -> Value {
    json!({
        "case_id": case_id,
        "case_number": format!("CN-{}", case_id),
        "priority": priority,
        "status": status,
        "contact": "support@acme.io",
        "type": "question",
        "account_name": "Acme",
        "subject": "Printer on fire again",
        "hops": 2,
        "bounces": 1,
        "created_at": 1_700_000_000,
        "updated_at": 1_700_000_000,
    })
}

/// Minimal playbook body with a node graph
pub fn playbook_payload(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Escalate stale tickets",
        "trigger_type": "scheduled",
        "trigger_data": {"cron": "0 * * * *"},
        "ui_data": {"nodes": {"0": {"type": "start"}}},
        "settings": {"timeout": 60}
    })
}
