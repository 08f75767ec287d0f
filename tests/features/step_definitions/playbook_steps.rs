//! Playbook step definitions

use cucumber::{given, then, when};
use serde_json::json;

use crate::common::playbook_payload;
use crate::features::TestWorld;

fn playbook<'a>(world: &'a TestWorld, name: &str) -> &'a (String, String) {
    world
        .playbooks
        .get(name)
        .unwrap_or_else(|| panic!("Unknown playbook {}", name))
}

#[given(expr = "a playbook named {string}")]
async fn playbook_named(world: &mut TestWorld, name: String) {
    let response = world.send("POST", "/api/v1/playbooks", playbook_payload(&name)).await;
    assert_eq!(response.status, 200, "body: {}", response.body);
    let id = response.body["id"].as_str().expect("id").to_string();
    let permanent_id = response.body["permanent_id"].as_str().expect("permanent id").to_string();
    world.playbooks.insert(name, (id, permanent_id));
}

#[when(expr = "I change the node graph of playbook {string}")]
async fn change_node_graph(world: &mut TestWorld, name: String) {
    let (id, _) = playbook(world, &name).clone();
    let body = json!({
        "nodes_dirty": true,
        "ui_data": {"nodes": {"0": {"type": "start"}, "1": {"type": "slack"}}}
    });
    world.send("PUT", &format!("/api/v1/playbooks/{}", id), body).await;
}

#[when(expr = "I rename playbook {string} to {string}")]
async fn rename_playbook(world: &mut TestWorld, name: String, new_name: String) {
    let (id, _) = playbook(world, &name).clone();
    world
        .send("PUT", &format!("/api/v1/playbooks/{}", id), json!({ "name": new_name }))
        .await;
}

#[when(expr = "I delete playbook {string} and an unknown playbook")]
async fn bulk_delete_with_unknown(world: &mut TestWorld, name: String) {
    let (id, _) = playbook(world, &name).clone();
    let unknown = uuid::Uuid::new_v4().to_string();
    world
        .send("DELETE", "/api/v1/playbooks", json!([id, unknown]))
        .await;
}

#[then(expr = "the update of playbook {string} should be a new revision")]
async fn update_is_new_revision(world: &mut TestWorld, name: String) {
    let (id, permanent_id) = playbook(world, &name).clone();
    let body = world.last_body();
    assert_ne!(body["id"], id.as_str());
    assert_eq!(body["previous_id"], id.as_str());
    assert_eq!(body["permanent_id"], permanent_id.as_str());
}

#[then(expr = "the update of playbook {string} should keep its revision")]
async fn update_keeps_revision(world: &mut TestWorld, name: String) {
    let (id, _) = playbook(world, &name).clone();
    let body = world.last_body();
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["updated"], true);
    assert!(body.get("previous_id").is_none());
}

#[then(expr = "the original revision of playbook {string} should be disabled")]
async fn original_disabled(world: &mut TestWorld, name: String) {
    let (id, _) = playbook(world, &name).clone();
    let response = world
        .send("GET", &format!("/api/v1/playbooks/{}", id), json!(null))
        .await;
    assert_eq!(response.body["enabled"], false);
}

#[then(expr = "the latest revision of playbook {string} should be named {string}")]
async fn latest_named(world: &mut TestWorld, name: String, expected: String) {
    let (_, permanent_id) = playbook(world, &name).clone();
    let response = world
        .send(
            "GET",
            &format!("/api/v1/playbooks/permanent-id/{}", permanent_id),
            json!(null),
        )
        .await;
    assert_eq!(response.body["name"], expected.as_str());
}

#[then(expr = "the delete results should be {string}")]
async fn delete_results(world: &mut TestWorld, expected: String) {
    let actual: Vec<String> = world.last_body()["records"]
        .as_array()
        .expect("records array")
        .iter()
        .map(|r| r["success"].to_string())
        .collect();
    let expected: Vec<String> = expected.split(',').map(|s| s.trim().to_string()).collect();
    assert_eq!(actual, expected);
}
