//! Product (workspace) step definitions

use cucumber::{given, then, when};
use serde_json::json;

use crate::features::TestWorld;

#[given(expr = "a product {string} with key {string}")]
async fn product_with_key(world: &mut TestWorld, name: String, key: String) {
    let response = world
        .send("POST", "/api/v1/products", json!({"name": name, "key": key}))
        .await;
    assert_eq!(response.status, 200, "body: {}", response.body);
    let id = response.body["id"].as_str().expect("id").to_string();
    world.products.insert(key, id);
}

#[when(expr = "I create a product {string} with key {string}")]
async fn create_product(world: &mut TestWorld, name: String, key: String) {
    world
        .send("POST", "/api/v1/products", json!({"name": name, "key": key}))
        .await;
}

#[when(expr = "I delete the products {string} together with id {string}")]
async fn delete_products(world: &mut TestWorld, keys: String, extra: String) {
    let mut ids: Vec<String> = keys
        .split(',')
        .map(|k| world.products.get(k.trim()).cloned().expect("known product key"))
        .collect();
    ids.push(extra);
    world.send("DELETE", "/api/v1/products", json!(ids)).await;
}

#[then(expr = "every delete should fail with {string}")]
async fn every_delete_fails(world: &mut TestWorld, message: String) {
    for record in world.last_body()["records"].as_array().expect("records array") {
        assert_eq!(record["success"], false);
        assert_eq!(record["error"], message.as_str());
    }
}

#[then(expr = "the product with key {string} should still exist")]
async fn product_still_exists(world: &mut TestWorld, key: String) {
    let id = world.products.get(&key).cloned().expect("known product key");
    let response = world
        .send("GET", &format!("/api/v1/products/{}", id), json!(null))
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["key"], key.as_str());
}
