//! Test world for Cucumber scenarios

use std::collections::HashMap;
use std::fmt;

use cucumber::World;
use serde_json::Value;

use crate::common::{test_config, MockAggregations, TestApp};

/// Test world that maintains state across scenario steps
#[derive(Default, World)]
pub struct TestWorld {
    /// Application under test, created by the first step needing it
    pub app: Option<TestApp>,

    /// Aggregation collaborators installed in the application
    pub mocks: MockAggregations,

    /// Authentication token for API calls
    pub auth_token: Option<String>,

    /// Response from last API call
    pub last_response: Option<TestResponse>,

    /// Config table ids by fixture name
    pub config_tables: HashMap<String, String>,

    /// Created playbooks (name -> (id, permanent id))
    pub playbooks: HashMap<String, (String, String)>,

    /// Created products (key -> id)
    pub products: HashMap<String, String>,
}

impl fmt::Debug for TestWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestWorld")
            .field("started", &self.app.is_some())
            .field("authenticated", &self.auth_token.is_some())
            .field("last_response", &self.last_response)
            .field("playbooks", &self.playbooks)
            .field("products", &self.products)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: u16,
    pub body: Value,
}

impl TestWorld {
    /// Application under test, started on first use
    pub async fn app(&mut self) -> &TestApp {
        if self.app.is_none() {
            let app = TestApp::with_aggregations(test_config(), self.mocks.aggregations()).await;
            self.app = Some(app);
        }
        self.app.as_ref().expect("application started")
    }

    /// Authenticate with the given roles
    pub async fn authenticate(&mut self, roles: &[&str]) {
        let token = self.app().await.token(roles);
        self.auth_token = Some(token);
    }

    /// Send a JSON request with the current token and remember the response
    pub async fn send(&mut self, method: &str, uri: &str, body: Value) -> &TestResponse {
        let token = self.auth_token.clone().unwrap_or_default();
        let response = self.app().await.send_json_as(method, uri, body, &token).await;
        let body = if response.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&response.body).unwrap_or(Value::Null)
        };
        self.last_response = Some(TestResponse {
            status: response.status.as_u16(),
            body,
        });
        self.last_response.as_ref().expect("response recorded")
    }

    /// Body of the last response
    pub fn last_body(&self) -> &Value {
        &self
            .last_response
            .as_ref()
            .expect("No response available")
            .body
    }
}
