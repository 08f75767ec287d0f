//! Product (workspace) endpoint integration tests

use serde_json::{json, Value};

use crate::common::{ProductFactory, TestApp};

async fn create_product(app: &TestApp, token: &str, body: Value) -> String {
    let response = app.post_json_as("/api/v1/products", body, token).await;
    response.assert_ok();
    let json: Value = response.json();
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_and_get_product() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let body = ProductFactory::new().create().with_name("Payments Core").build();

    let id = create_product(&app, &token, body).await;

    let response = app.get_as(&format!("/api/v1/products/{}", id), &token).await;
    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["id"], id);
    assert_eq!(json["name"], "Payments Core");
    assert_eq!(json["disabled"], false);
    assert_eq!(json["integration_ids"], json!([1, 2]));
}

#[tokio::test]
async fn test_workspace_alias_routes_to_products() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let id = create_product(&app, &token, ProductFactory::new().create().build()).await;

    app.get_as(&format!("/api/v1/org/workspaces/{}", id), &token)
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_create_validation_messages() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let cases = [
        (
            json!({"name": "  ", "key": "OK"}),
            "Workspace name cannot be null or empty or blank.".to_string(),
        ),
        (
            json!({"name": "bad!name", "key": "OK"}),
            "Workspace name should contain only 'a-z A-Z 0-9 -_' or space. Input: bad!name"
                .to_string(),
        ),
        (
            json!({"name": "fine"}),
            "Workspace key cannot be null or empty or blank.".to_string(),
        ),
        (
            json!({"name": "fine", "key": "has space"}),
            "Workspace key should contain only 'a-z A-Z 0-9 -_'. Input: has space".to_string(),
        ),
    ];

    for (body, message) in cases {
        let response = app.post_json_as("/api/v1/products", body, &token).await;
        response.assert_bad_request();
        assert_eq!(response.error_message(), message);
    }
}

#[tokio::test]
async fn test_duplicate_key_and_name_conflict() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    create_product(&app, &token, json!({"name": "Search", "key": "SRCH"})).await;

    let response = app
        .post_json_as("/api/v1/products", json!({"name": "Search 2", "key": "SRCH"}), &token)
        .await;
    response.assert_conflict();
    assert_eq!(response.error_message(), "Key already exists");

    let response = app
        .post_json_as("/api/v1/products", json!({"name": "Search", "key": "SRCH2"}), &token)
        .await;
    response.assert_conflict();
    assert_eq!(response.error_message(), "Name already exists");
}

#[tokio::test]
async fn test_get_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let response = app.get_as("/api/v1/products/404", &token).await;

    response.assert_not_found();
    assert_eq!(response.error_message(), "Product with id 404 not found.");
}

#[tokio::test]
async fn test_update_rejects_disabled_change() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let id = create_product(&app, &token, json!({"name": "Mobile", "key": "MOB"})).await;

    let response = app
        .put_json_as(
            &format!("/api/v1/products/{}", id),
            json!({"disabled": true}),
            &token,
        )
        .await;
    response.assert_bad_request();

    // An unchanged value is accepted
    app.put_json_as(
        &format!("/api/v1/products/{}", id),
        json!({"disabled": false, "description": "apps"}),
        &token,
    )
    .await
    .assert_ok();

    let json: Value = app
        .get_as(&format!("/api/v1/products/{}", id), &token)
        .await
        .json();
    assert_eq!(json["description"], "apps");
}

#[tokio::test]
async fn test_disable_endpoint() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let id = create_product(&app, &token, json!({"name": "Legacy", "key": "LGC"})).await;

    let response = app
        .send_json_as(
            "PATCH",
            &format!("/api/v1/products/{}/disable?disabled=true", id),
            json!({}),
            &token,
        )
        .await;
    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["success"], true);

    let json: Value = app
        .get_as(&format!("/api/v1/products/{}", id), &token)
        .await
        .json();
    assert_eq!(json["disabled"], true);
}

#[tokio::test]
async fn test_cannot_disable_immutable_product() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let body = ProductFactory::new().create().immutable().build();
    let id = create_product(&app, &token, body).await;

    let response = app
        .send_json_as(
            "PATCH",
            &format!("/api/v1/products/{}/disable?disabled=true", id),
            json!({}),
            &token,
        )
        .await;

    response.assert_bad_request();
    assert_eq!(response.error_message(), "Cannot disable read-only project.");
}

#[tokio::test]
async fn test_bulk_delete_is_all_or_nothing() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let factory = ProductFactory::new();
    let first = create_product(&app, &token, factory.create().build()).await;
    let second = create_product(&app, &token, factory.create().build()).await;

    let response = app
        .send_json_as("DELETE", "/api/v1/products", json!([first, "999"]), &token)
        .await;
    response.assert_ok();
    let json: Value = response.json();
    for record in json["records"].as_array().unwrap() {
        assert_eq!(record["success"], false);
        assert_eq!(record["error"], "Product with id 999 not found.");
    }
    app.get_as(&format!("/api/v1/products/{}", first), &token)
        .await
        .assert_ok();

    let json: Value = app
        .send_json_as("DELETE", "/api/v1/products", json!([first, second]), &token)
        .await
        .json();
    assert!(json["records"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["success"] == true));
    app.get_as(&format!("/api/v1/products/{}", second), &token)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_bulk_delete_rejects_immutable_product() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let factory = ProductFactory::new();
    let locked = create_product(&app, &token, factory.create().immutable().build()).await;

    let json: Value = app
        .send_json_as("DELETE", "/api/v1/products", json!([locked]), &token)
        .await
        .json();

    assert_eq!(json["records"][0]["success"], false);
    assert_eq!(json["records"][0]["error"], "Cannot remove read-only project.");
}

#[tokio::test]
async fn test_list_filters_by_partial_name() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    create_product(&app, &token, json!({"name": "Billing", "key": "BIL"})).await;
    create_product(&app, &token, json!({"name": "Search", "key": "SRC"})).await;

    let response = app
        .post_json_as(
            "/api/v1/products/list",
            json!({"filter": {"partial": {"name": "bill"}}}),
            &token,
        )
        .await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 1);
    assert_eq!(json["records"][0]["key"], "BIL");
}

#[tokio::test]
async fn test_tenant_admin_creates_but_cannot_delete() {
    let app = TestApp::new().await;
    let token = app.token(&["TENANT_ADMIN"]);
    let id = create_product(&app, &token, ProductFactory::new().create().build()).await;

    app.send_json_as("DELETE", "/api/v1/products", json!([id]), &token)
        .await
        .assert_forbidden();
}
