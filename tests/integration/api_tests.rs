//! API integration tests
//!
//! Health probes and the authentication/authorization layers.

use serde_json::json;

use crate::common::{generate_test_token, TestApp};

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_detailed_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/detailed").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["components"]["database"]["status"], "healthy");
    assert_eq!(json["components"]["cache"]["enabled"], false);
}

#[tokio::test]
async fn test_liveness_and_readiness_probes() {
    let app = TestApp::new().await;
    app.get("/api/v1/health/live").await.assert_ok();
    app.get("/api/v1/health/ready").await.assert_ok();
}

#[tokio::test]
async fn test_protected_endpoint_requires_token() {
    let app = TestApp::new().await;
    let response = app
        .post_json("/api/v1/salesforce_cases/cases_report", json!({}))
        .await;

    response.assert_unauthorized();
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = TestApp::new().await;
    let response = app
        .post_json_as("/api/v1/playbooks/list", json!({}), "not-a-jwt")
        .await;

    response.assert_unauthorized();
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let app = TestApp::new().await;
    let mut other = app.state.config.clone();
    other.auth.jwt_secret = "another_secret_key_that_is_at_least_32_bytes".to_string();
    let token = generate_test_token(&other, "acme", &["ADMIN"]);

    let response = app.post_json_as("/api/v1/playbooks/list", json!({}), &token).await;
    response.assert_unauthorized();
}

#[tokio::test]
async fn test_report_forbidden_without_report_role() {
    let app = TestApp::new().await;
    let token = app.token(&["ASSIGNED_ISSUES_USER"]);

    let response = app
        .post_json_as("/api/v1/jira_issues/tickets_report", json!({}), &token)
        .await;

    response.assert_forbidden();
}

#[tokio::test]
async fn test_unknown_roles_grant_nothing() {
    let app = TestApp::new().await;
    let token = app.token(&["WIZARD"]);

    let response = app
        .post_json_as("/api/v1/activitylogs/list", json!({}), &token)
        .await;

    response.assert_forbidden();
}

#[tokio::test]
async fn test_config_tables_empty_for_new_tenant() {
    let app = TestApp::new().await;
    let token = app.token(&["LIMITED_USER"]);

    let response = app.get_as("/api/v1/config-tables", &token).await;
    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["count"], 0);
    assert_eq!(json["records"], json!([]));
}

#[tokio::test]
async fn test_config_table_not_found() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .get_as("/api/v1/config-tables/00000000-0000-4000-8000-000000000000", &token)
        .await;

    response.assert_not_found();
}
