//! SEI API Library
//!
//! REST tier of the software engineering intelligence platform: report
//! controllers per integration domain, playbooks, products and the
//! activity log.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser, Claims};

use filters::{
    JiraIssuesFilter, SalesforceCaseFilter, SonarQubeIssueFilter, TestRailsTestFilter,
    ZendeskTicketFilter,
};
use services::{
    ActivityLogService, AggregationCache, AggregationService, ConfigTableService,
    IngestionService, OrgUnitService, ProductService, RecordAggregationService, RunbookService,
};

/// Aggregation collaborators, one per integration domain
#[derive(Clone)]
pub struct Aggregations {
    pub salesforce_cases: Arc<dyn AggregationService<SalesforceCaseFilter>>,
    pub zendesk_tickets: Arc<dyn AggregationService<ZendeskTicketFilter>>,
    pub testrails_tests: Arc<dyn AggregationService<TestRailsTestFilter>>,
    pub sonarqube_issues: Arc<dyn AggregationService<SonarQubeIssueFilter>>,
    pub jira_issues: Arc<dyn AggregationService<JiraIssuesFilter>>,
}

impl Aggregations {
    /// Record-backed aggregation for every domain
    pub fn from_records(pool: &DbPool) -> Self {
        Self {
            salesforce_cases: Arc::new(RecordAggregationService::new(pool.clone())),
            zendesk_tickets: Arc::new(RecordAggregationService::new(pool.clone())),
            testrails_tests: Arc::new(RecordAggregationService::new(pool.clone())),
            sonarqube_issues: Arc::new(RecordAggregationService::new(pool.clone())),
            jira_issues: Arc::new(RecordAggregationService::new(pool.clone())),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Response cache for report endpoints
    pub cache: AggregationCache,
    pub aggregations: Aggregations,
    pub activity_log: Arc<ActivityLogService>,
    pub org_units: Arc<OrgUnitService>,
    pub ingestion: Arc<IngestionService>,
    pub config_tables: Arc<ConfigTableService>,
    pub runbooks: Arc<RunbookService>,
    pub products: Arc<ProductService>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let aggregations = Aggregations::from_records(&db);
        Self::with_aggregations(config, db, aggregations)
    }

    /// State with custom aggregation collaborators
    pub fn with_aggregations(config: AppConfig, db: DbPool, aggregations: Aggregations) -> Self {
        Self {
            cache: AggregationCache::new(&config.cache),
            activity_log: Arc::new(ActivityLogService::new(db.clone(), &config.activity_log)),
            org_units: Arc::new(OrgUnitService::new(db.clone())),
            ingestion: Arc::new(IngestionService::new(db.clone())),
            config_tables: Arc::new(ConfigTableService::new(db.clone())),
            runbooks: Arc::new(RunbookService::new(db.clone())),
            products: Arc::new(ProductService::new(db.clone())),
            aggregations,
            config,
            db,
        }
    }
}
