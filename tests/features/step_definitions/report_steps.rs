//! Report step definitions

use cucumber::{given, then, when};
use serde_json::{json, Map};

use sei_api::models::AggregationResult;

use crate::common::{ids, seed_config_table, ConfigTableFixtures, TEST_TENANT};
use crate::features::TestWorld;

fn split_list(values: &str) -> Vec<String> {
    values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[given(expr = "the Salesforce aggregation returns {int} cases")]
async fn salesforce_returns(world: &mut TestWorld, count: u64) {
    world
        .mocks
        .salesforce_cases
        .set_results(vec![AggregationResult::count("any", count)]);
}

#[given(expr = "the tenant has the {string} config table")]
async fn tenant_has_config_table(world: &mut TestWorld, name: String) {
    let table = match name.as_str() {
        "teams" => ConfigTableFixtures::teams(),
        "teams with multi-valued status" => ConfigTableFixtures::teams_with_multi_value_status(),
        other => panic!("Unknown config table fixture: {}", other),
    };
    let state = world.app().await.state.clone();
    seed_config_table(&state, TEST_TENANT, &table).await;
    world.config_tables.insert(name, table.id);
}

async fn request_report(
    world: &mut TestWorld,
    report: &str,
    across: &str,
    table_id: &str,
    priorities: Option<&str>,
) {
    let mut filter = Map::new();
    filter.insert("config_table_id".to_string(), json!(table_id));
    if let Some(priorities) = priorities {
        filter.insert("priorities".to_string(), json!(split_list(priorities)));
    }
    let uri = format!("/api/v1/salesforce_cases/{}", report);
    world
        .send("POST", &uri, json!({"across": across, "filter": filter}))
        .await;
}

fn table_id(world: &TestWorld, name: &str) -> String {
    world
        .config_tables
        .get(name)
        .cloned()
        .unwrap_or_else(|| ids::MISSING_TABLE_ID.to_string())
}

#[when(expr = "I request the {string} Salesforce report across {string} with config table {string}")]
async fn request_with_table(world: &mut TestWorld, report: String, across: String, table: String) {
    let id = table_id(world, &table);
    request_report(world, &report, &across, &id, None).await;
}

#[when(
    expr = "I request the {string} Salesforce report across {string} with config table {string} and priorities {string}"
)]
async fn request_with_table_and_priorities(
    world: &mut TestWorld,
    report: String,
    across: String,
    table: String,
    priorities: String,
) {
    let id = table_id(world, &table);
    request_report(world, &report, &across, &id, Some(&priorities)).await;
}

#[when(expr = "I request the {string} Salesforce report across {string} with config table id {string}")]
async fn request_with_table_id(world: &mut TestWorld, report: String, across: String, id: String) {
    request_report(world, &report, &across, &id, None).await;
}

#[then(expr = "the result keys should be {string}")]
async fn result_keys(world: &mut TestWorld, keys: String) {
    let actual: Vec<String> = world.last_body()["records"]
        .as_array()
        .expect("records array")
        .iter()
        .filter_map(|r| r["key"].as_str().map(str::to_string))
        .collect();
    assert_eq!(actual, split_list(&keys));
}

#[then(expr = "every result should count {int} cases")]
async fn every_result_counts(world: &mut TestWorld, count: u64) {
    for record in world.last_body()["records"].as_array().expect("records array") {
        assert_eq!(record["count"], json!(count));
    }
}

#[then(expr = "the Salesforce aggregation should have been called {int} time(s)")]
async fn aggregation_called(world: &mut TestWorld, times: usize) {
    assert_eq!(world.mocks.salesforce_cases.call_count(), times);
}

#[then(expr = "the aggregation for {string} should filter priorities {string}")]
async fn aggregation_priorities(world: &mut TestWorld, context: String, priorities: String) {
    let calls = world.mocks.salesforce_cases.calls();
    let call = calls
        .iter()
        .find(|c| c.context.as_deref() == Some(context.as_str()))
        .unwrap_or_else(|| panic!("No aggregation call for context {}", context));
    assert_eq!(call.filter.priorities, split_list(&priorities));
}
