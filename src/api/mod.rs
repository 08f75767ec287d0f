//! API routes and handlers
//!
//! Everything here is nested under `/api/v1`; report endpoints keep their
//! historical `/<domain>` paths.

use axum::{routing::get, Router};

use crate::AppState;

mod activity_logs;
mod config_tables;
mod health;
mod jira_issues;
mod playbooks;
mod products;
pub mod reports;
mod salesforce_cases;
mod sonarqube_issues;
mod zendesk_tickets;

pub use health::*;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
}

/// Protected API routes (authentication required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        // Integration report endpoints
        .nest("/salesforce_cases", salesforce_cases::routes())
        .nest("/zendesk_tickets", zendesk_tickets::routes())
        .nest("/testrails_tests", testrails_tests::routes())
        .nest("/sonarqube_issues", sonarqube_issues::routes())
        .nest("/jira_issues", jira_issues::routes())
        // Resource endpoints
        .nest("/playbooks", playbooks::routes())
        .nest("/products", products::routes())
        .nest("/org/workspaces", products::routes())
        .nest("/config-tables", config_tables::routes())
        .nest("/activitylogs", activity_logs::routes())
}

/// Create the full API router (public + protected; useful for tests)
pub fn routes() -> Router<AppState> {
    public_routes().merge(protected_routes())
}
