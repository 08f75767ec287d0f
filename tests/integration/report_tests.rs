//! Report endpoint integration tests
//!
//! Most tests install mock aggregation collaborators and assert on the
//! filters the handlers hand to them.

use serde_json::{json, Value};

use sei_api::filters::salesforce::{SalesforceCaseAcross, SalesforceCaseCalculation};
use sei_api::filters::DomainFilter;
use sei_api::models::AggregationResult;

use crate::common::{
    ids, seed_config_table, seed_record, salesforce_case, test_config, test_config_with_cache,
    CallKind, ConfigTableFixtures, MockAggregations, TestApp, TEST_TENANT,
};

async fn mocked_app() -> (TestApp, MockAggregations) {
    let mocks = MockAggregations::new();
    let app = TestApp::with_aggregations(test_config(), mocks.aggregations()).await;
    (app, mocks)
}

#[tokio::test]
async fn test_values_requires_fields() {
    let (app, mocks) = mocked_app().await;
    let token = app.admin_token();

    let response = app
        .post_json_as("/api/v1/salesforce_cases/values", json!({"fields": []}), &token)
        .await;

    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "missing or empty list of 'fields' provided."
    );
    assert_eq!(mocks.salesforce_cases.call_count(), 0);
}

#[tokio::test]
async fn test_values_groups_each_known_field() {
    let (app, mocks) = mocked_app().await;
    mocks
        .salesforce_cases
        .set_results(vec![AggregationResult::count("high", 4)]);
    let token = app.admin_token();

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/values",
            json!({"fields": ["priority", "no_such_field", "status"]}),
            &token,
        )
        .await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 2);
    assert_eq!(json["records"][0]["priority"][0]["key"], "high");
    assert_eq!(json["records"][1]["status"][0]["count"], 4);

    let acrosses: Vec<_> = mocks
        .salesforce_cases
        .calls()
        .iter()
        .map(|c| c.filter.across())
        .collect();
    assert_eq!(
        acrosses,
        vec![
            Some(SalesforceCaseAcross::Priority),
            Some(SalesforceCaseAcross::Status)
        ]
    );
}

#[tokio::test]
async fn test_report_without_config_table_groups_once() {
    let (app, mocks) = mocked_app().await;
    mocks.salesforce_cases.set_results(vec![
        AggregationResult::count("open", 3),
        AggregationResult::count("closed", 1),
    ]);
    let token = app.token(&["LIMITED_USER"]);

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/bounce_report",
            json!({"across": "status", "filter": {"priorities": ["high"]}}),
            &token,
        )
        .await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 2);
    assert_eq!(json["_metadata"]["total_count"], 2);

    let calls = mocks.salesforce_cases.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, CallKind::GroupBy);
    assert_eq!(calls[0].context, None);
    assert_eq!(calls[0].filter.calculation(), SalesforceCaseCalculation::Bounces);
    assert_eq!(calls[0].filter.priorities, vec!["high".to_string()]);
    assert!(calls[0].filter.base().ingested_at.is_some());
}

#[tokio::test]
async fn test_unknown_across_falls_back_to_default() {
    let (app, mocks) = mocked_app().await;
    let token = app.admin_token();

    app.post_json_as(
        "/api/v1/salesforce_cases/cases_report",
        json!({"across": "planet"}),
        &token,
    )
    .await
    .assert_ok();

    let calls = mocks.salesforce_cases.calls();
    assert_eq!(calls[0].filter.across(), Some(SalesforceCaseAcross::Contact));
}

#[tokio::test]
async fn test_config_table_fans_out_per_row() {
    let (app, mocks) = mocked_app().await;
    mocks
        .salesforce_cases
        .set_results(vec![AggregationResult::count("ignored", 2)]);
    seed_config_table(&app.state, TEST_TENANT, &ConfigTableFixtures::teams()).await;
    let token = app.admin_token();

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/cases_report",
            json!({
                "across": "status",
                "filter": {
                    "config_table_id": ids::TEAMS_TABLE_ID,
                    "priorities": ["high", "low"]
                }
            }),
            &token,
        )
        .await;

    response.assert_ok();
    let json: Value = response.json();
    let keys: Vec<&str> = json["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["open", "closed"]);

    let calls = mocks.salesforce_cases.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].context.as_deref(), Some("open"));
    assert_eq!(calls[0].filter.priorities, vec!["high".to_string()]);
    assert_eq!(calls[1].context.as_deref(), Some("closed"));
    assert_eq!(calls[1].filter.priorities, vec!["low".to_string()]);
}

#[tokio::test]
async fn test_config_table_validation_messages() {
    let (app, mocks) = mocked_app().await;
    seed_config_table(&app.state, TEST_TENANT, &ConfigTableFixtures::teams()).await;
    let token = app.admin_token();

    let cases = [
        (
            json!({"across": "status", "filter": {"config_table_id": "not-a-uuid"}}),
            "Invalid config table key parameter. Required UUID. Provided: not-a-uuid",
        ),
        (
            json!({"across": "status", "filter": {"config_table_id": ids::MISSING_TABLE_ID}}),
            "No Config table found for given config_table_id",
        ),
        (
            json!({"across": "account", "filter": {"config_table_id": ids::TEAMS_TABLE_ID}}),
            "No column found for given across field",
        ),
    ];

    for (body, message) in cases {
        let response = app
            .post_json_as("/api/v1/salesforce_cases/cases_report", body, &token)
            .await;
        response.assert_bad_request();
        assert_eq!(response.error_message(), message);
    }
    assert_eq!(mocks.salesforce_cases.call_count(), 0);
}

#[tokio::test]
async fn test_multi_value_across_column_rejected() {
    let (app, _mocks) = mocked_app().await;
    seed_config_table(
        &app.state,
        TEST_TENANT,
        &ConfigTableFixtures::teams_with_multi_value_status(),
    )
    .await;
    let token = app.admin_token();

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/cases_report",
            json!({"across": "status", "filter": {"config_table_id": ids::TEAMS_TABLE_ID}}),
            &token,
        )
        .await;

    response.assert_bad_request();
    assert_eq!(response.error_message(), "Across column should be single value");
}

#[tokio::test]
async fn test_config_tables_are_tenant_scoped() {
    let (app, _mocks) = mocked_app().await;
    seed_config_table(&app.state, "globex", &ConfigTableFixtures::teams()).await;
    let token = app.admin_token();

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/cases_report",
            json!({"across": "status", "filter": {"config_table_id": ids::TEAMS_TABLE_ID}}),
            &token,
        )
        .await;

    response.assert_bad_request();
}

#[tokio::test]
async fn test_stacks_take_precedence_over_config_table() {
    let (app, mocks) = mocked_app().await;
    let token = app.admin_token();

    app.post_json_as(
        "/api/v1/salesforce_cases/cases_report",
        json!({
            "across": "priority",
            "stacks": ["status"],
            "filter": {"config_table_id": ids::MISSING_TABLE_ID}
        }),
        &token,
    )
    .await
    .assert_ok();

    let calls = mocks.salesforce_cases.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, CallKind::Stacked);
    assert_eq!(calls[0].stacks, vec!["status".to_string()]);
}

#[tokio::test]
async fn test_list_applies_config_table_row() {
    let (app, mocks) = mocked_app().await;
    mocks
        .salesforce_cases
        .set_rows(vec![json!({"case_id": "1"}), json!({"case_id": "2"})]);
    seed_config_table(&app.state, TEST_TENANT, &ConfigTableFixtures::teams()).await;
    let token = app.admin_token();

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/list",
            json!({
                "page": 0,
                "page_size": 1,
                "filter": {
                    "config_table_id": ids::TEAMS_TABLE_ID,
                    "config_table_row_id": "r-alpha"
                }
            }),
            &token,
        )
        .await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 2);
    assert_eq!(json["_metadata"]["has_next"], true);

    let calls = mocks.salesforce_cases.calls();
    assert_eq!(calls[0].kind, CallKind::List);
    assert_eq!(
        calls[0].filter.priorities,
        vec!["high".to_string(), "urgent".to_string()]
    );
}

#[tokio::test]
async fn test_list_requires_row_with_config_table() {
    let (app, _mocks) = mocked_app().await;
    seed_config_table(&app.state, TEST_TENANT, &ConfigTableFixtures::teams()).await;
    let token = app.admin_token();

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/list",
            json!({"filter": {"config_table_id": ids::TEAMS_TABLE_ID}}),
            &token,
        )
        .await;

    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "Config table not found for given config_table_id"
    );
}

#[tokio::test]
async fn test_hygiene_requires_types() {
    let (app, mocks) = mocked_app().await;
    let token = app.admin_token();

    let response = app
        .post_json_as("/api/v1/zendesk_tickets/hygiene_report", json!({}), &token)
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "missing or empty list of 'hygiene_types' provided."
    );

    app.post_json_as(
        "/api/v1/zendesk_tickets/hygiene_report",
        json!({"filter": {"hygiene_types": ["idle"]}}),
        &token,
    )
    .await
    .assert_ok();
    assert_eq!(mocks.zendesk_tickets.call_count(), 1);
}

#[tokio::test]
async fn test_cache_serves_repeated_requests() {
    let mocks = MockAggregations::new();
    mocks
        .jira_issues
        .set_results(vec![AggregationResult::count("done", 7)]);
    let app = TestApp::with_aggregations(test_config_with_cache(), mocks.aggregations()).await;
    let token = app.admin_token();
    let body = json!({"across": "status", "filter": {"ingested_at": 1_700_000_000}});

    for _ in 0..2 {
        app.post_json_as("/api/v1/jira_issues/tickets_report", body.clone(), &token)
            .await
            .assert_ok();
    }
    assert_eq!(mocks.jira_issues.call_count(), 1);

    let response = app
        .post_json_as(
            "/api/v1/jira_issues/tickets_report?there_is_no_cache=true",
            body.clone(),
            &token,
        )
        .await;
    response.assert_ok();
    assert_eq!(mocks.jira_issues.call_count(), 2);

    let json: Value = response.json();
    assert_eq!(json["records"][0]["count"], 7);
}

#[tokio::test]
async fn test_cache_keys_differ_by_filter() {
    let mocks = MockAggregations::new();
    let app = TestApp::with_aggregations(test_config_with_cache(), mocks.aggregations()).await;
    let token = app.admin_token();

    for status in ["open", "closed"] {
        app.post_json_as(
            "/api/v1/jira_issues/tickets_report",
            json!({"filter": {"statuses": [status], "ingested_at": 1}}),
            &token,
        )
        .await
        .assert_ok();
    }
    assert_eq!(mocks.jira_issues.call_count(), 2);
}

#[tokio::test]
async fn test_collaborator_failure_is_internal_error() {
    let (app, mocks) = mocked_app().await;
    mocks.sonarqube_issues.set_failing(true);
    let token = app.admin_token();

    let response = app
        .post_json_as("/api/v1/sonarqube_issues/issues_report", json!({}), &token)
        .await;

    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_report_over_stored_records_uses_snapshot() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let domain = "salesforce_cases";

    seed_record(&app.state, TEST_TENANT, domain, "1", 100, salesforce_case("1", "high", "open")).await;
    seed_record(&app.state, TEST_TENANT, domain, "2", 100, salesforce_case("2", "high", "open")).await;
    seed_record(&app.state, TEST_TENANT, domain, "3", 100, salesforce_case("3", "low", "closed")).await;
    // Newer than the requested snapshot
    seed_record(&app.state, TEST_TENANT, domain, "3", 300, salesforce_case("3", "high", "closed")).await;

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/cases_report",
            json!({"across": "priority", "filter": {"ingested_at": 200}}),
            &token,
        )
        .await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["records"][0]["key"], "high");
    assert_eq!(json["records"][0]["count"], 2);
    assert_eq!(json["records"][1]["key"], "low");
    assert_eq!(json["records"][1]["count"], 1);
}

#[tokio::test]
async fn test_jira_values_ignore_created_window() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let issue = json!({"key": "SEI-1", "status": "DONE", "issue_created_at": 50});
    seed_record(&app.state, TEST_TENANT, "jira_issues", "SEI-1", 100, issue).await;

    let response = app
        .post_json_as(
            "/api/v1/jira_issues/values",
            json!({
                "fields": ["status"],
                "filter": {"ingested_at": 100, "issue_created_at": {"$gt": 500}}
            }),
            &token,
        )
        .await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["records"][0]["status"][0]["key"], "DONE");
    assert_eq!(json["records"][0]["status"][0]["count"], 1);

    // The window still applies to reports
    let report = app
        .post_json_as(
            "/api/v1/jira_issues/tickets_report",
            json!({
                "across": "status",
                "filter": {"ingested_at": 100, "issue_created_at": {"$gt": 500}}
            }),
            &token,
        )
        .await;
    report.assert_ok();
    assert_eq!(report.json::<Value>()["count"], 0);
}

#[tokio::test]
async fn test_list_over_stored_records_filters_by_field() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let domain = "salesforce_cases";

    seed_record(&app.state, TEST_TENANT, domain, "1", 100, salesforce_case("1", "high", "open")).await;
    seed_record(&app.state, TEST_TENANT, domain, "2", 100, salesforce_case("2", "low", "open")).await;
    seed_record(&app.state, "globex", domain, "3", 100, salesforce_case("3", "high", "open")).await;

    let response = app
        .post_json_as(
            "/api/v1/salesforce_cases/list",
            json!({"filter": {"priorities": ["high"], "ingested_at": 100}}),
            &token,
        )
        .await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 1);
    assert_eq!(json["records"][0]["case_id"], "1");
}
