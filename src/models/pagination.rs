//! Pagination envelopes

use serde::{Deserialize, Serialize};

/// Result of a collaborator list or aggregation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbListResponse<T> {
    pub total_count: usize,
    pub records: Vec<T>,
}

impl<T> DbListResponse<T> {
    pub fn of(records: Vec<T>, total_count: usize) -> Self {
        Self {
            total_count,
            records,
        }
    }

    /// Wrap records whose count is the total
    pub fn from_records(records: Vec<T>) -> Self {
        let total_count = records.len();
        Self {
            total_count,
            records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
    pub total_count: usize,
}

/// Response body of every list and report endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(rename = "_metadata")]
    pub metadata: PageMetadata,
    pub count: usize,
    pub records: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn of(page: u32, page_size: u32, response: DbListResponse<T>) -> Self {
        let count = response.records.len();
        let total_count = response.total_count.max(count);
        let has_next = (page as usize + 1) * (page_size as usize) < total_count;
        Self {
            metadata: PageMetadata {
                page,
                page_size,
                has_next,
                total_count,
            },
            count,
            records: response.records,
        }
    }

    pub fn from_records(page: u32, page_size: u32, records: Vec<T>) -> Self {
        Self::of(page, page_size, DbListResponse::from_records(records))
    }
}
