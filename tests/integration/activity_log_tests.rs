//! Activity log integration tests

use serde_json::{json, Value};

use crate::common::{playbook_payload, test_config, TestApp, TEST_TENANT};

async fn activity(app: &TestApp, filter: Value) -> Value {
    let token = app.token(&["AUDITOR"]);
    let response = app
        .post_json_as("/api/v1/activitylogs/list", json!({ "filter": filter }), &token)
        .await;
    response.assert_ok();
    response.json()
}

#[tokio::test]
async fn test_product_lifecycle_is_logged() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let created: Value = app
        .post_json_as("/api/v1/products", json!({"name": "Ledger", "key": "LDG"}), &token)
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    app.send_json_as(
        "PATCH",
        &format!("/api/v1/products/{}/disable?disabled=true", id),
        json!({}),
        &token,
    )
    .await
    .assert_ok();

    let json = activity(&app, json!({"target_item_types": ["PRODUCT"], "actions": ["CREATED"]})).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["records"][0]["body"], format!("Created Products item: {}.", id));
    assert_eq!(json["records"][0]["email"], format!("tester@{}.io", TEST_TENANT));
    assert_eq!(json["records"][0]["details"]["item"]["key"], "LDG");

    let json = activity(&app, json!({"target_items": [id], "actions": ["EDITED"]})).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["records"][0]["body"], format!("Disabled Products item: {}", id));
}

#[tokio::test]
async fn test_failed_operations_are_not_logged() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    app.post_json_as("/api/v1/products", json!({"name": "", "key": "X"}), &token)
        .await
        .assert_bad_request();

    let json = activity(&app, json!({})).await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn test_edit_diff_only_for_opted_in_tenants() {
    let mut config = test_config();
    config.activity_log.diff_for_tenants.insert(TEST_TENANT.to_string());
    let app = TestApp::with_config(config).await;
    let token = app.admin_token();

    let created: Value = app
        .post_json_as("/api/v1/playbooks", playbook_payload("nightly"), &token)
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    app.put_json_as(
        &format!("/api/v1/playbooks/{}", id),
        json!({"name": "nightly v2"}),
        &token,
    )
    .await
    .assert_ok();

    let json = activity(&app, json!({"target_item_types": ["PLAYBOOK"], "actions": ["EDITED"]})).await;
    assert_eq!(json["count"], 1);
    let diff = &json["records"][0]["details"]["diff"];
    assert_eq!(diff["name"]["before"], "nightly");
    assert_eq!(diff["name"]["after"], "nightly v2");
    assert!(diff.get("description").is_none());
}

#[tokio::test]
async fn test_edit_without_opt_in_has_no_diff() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let created: Value = app
        .post_json_as("/api/v1/playbooks", playbook_payload("weekly"), &token)
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    app.put_json_as(
        &format!("/api/v1/playbooks/{}", id),
        json!({"name": "weekly v2"}),
        &token,
    )
    .await
    .assert_ok();

    let json = activity(&app, json!({"actions": ["EDITED"]})).await;
    assert_eq!(json["count"], 1);
    assert!(json["records"][0]["details"].get("diff").is_none());
    assert_eq!(json["records"][0]["details"]["item"]["name"], "weekly v2");
}

#[tokio::test]
async fn test_activity_logs_are_tenant_scoped() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    app.post_json_as("/api/v1/products", json!({"name": "Ledger", "key": "LDG"}), &token)
        .await
        .assert_ok();

    let other = crate::common::generate_test_token(&app.state.config, "globex", &["AUDITOR"]);
    let json: Value = app
        .post_json_as("/api/v1/activitylogs/list", json!({}), &other)
        .await
        .json();
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn test_limited_user_cannot_read_activity_logs() {
    let app = TestApp::new().await;
    let token = app.token(&["LIMITED_USER"]);

    app.post_json_as("/api/v1/activitylogs/list", json!({}), &token)
        .await
        .assert_forbidden();
}
