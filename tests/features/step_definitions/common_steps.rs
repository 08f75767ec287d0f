//! Common step definitions used across features

use cucumber::{given, then};

use crate::features::TestWorld;

#[given("a running API")]
async fn running_api(world: &mut TestWorld) {
    world.app().await;
}

#[given(expr = "I am authenticated with role {string}")]
async fn authenticated_with_role(world: &mut TestWorld, role: String) {
    world.authenticate(&[role.as_str()]).await;
}

#[given("I am not authenticated")]
async fn not_authenticated(world: &mut TestWorld) {
    world.auth_token = None;
}

#[then(expr = "the response status should be {int}")]
async fn response_status(world: &mut TestWorld, status: u16) {
    let response = world.last_response.as_ref().expect("No response available");
    assert_eq!(response.status, status, "body: {}", response.body);
}

#[then(expr = "the error message should be {string}")]
async fn error_message(world: &mut TestWorld, message: String) {
    assert_eq!(world.last_body()["message"], message.as_str());
}
