//! Business logic services

pub mod activity_log;
pub mod aggregation;
pub mod cache;
pub mod config_tables;
pub mod ingestion;
pub mod org_units;
pub mod products;
pub mod runbooks;

pub use activity_log::ActivityLogService;
pub use aggregation::{AggregationService, RecordAggregationService};
pub use cache::{cache_key, AggregationCache, Cache, CacheEntry, CacheEvictionJob, CacheStats};
pub use config_tables::ConfigTableService;
pub use ingestion::IngestionService;
pub use org_units::OrgUnitService;
pub use products::{ProductError, ProductService};
pub use runbooks::{PlaybookError, RevisionRef, RunbookService, RunbookUpdate};
