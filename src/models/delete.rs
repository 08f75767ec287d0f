//! Delete result envelopes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteResponse {
    pub fn success(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    pub records: Vec<DeleteResponse>,
}

impl BulkDeleteResponse {
    pub fn of(records: Vec<DeleteResponse>) -> Self {
        Self { records }
    }

    /// Same outcome reported for every id
    pub fn uniform(ids: &[String], success: bool, error: Option<String>) -> Self {
        Self {
            records: ids
                .iter()
                .map(|id| DeleteResponse {
                    id: id.clone(),
                    success,
                    error: error.clone(),
                })
                .collect(),
        }
    }
}
