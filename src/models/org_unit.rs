//! Org units and integrations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Org unit scoping applied to report requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgUnit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub integration_ids: Vec<String>,
    /// Filter entries applied when the request does not set them
    #[serde(default)]
    pub default_filters: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    pub id: String,
    /// Source application, e.g. `jira` or `salesforce`
    pub application: String,
    pub name: String,
}
