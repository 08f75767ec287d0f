//! SonarQube issue report endpoints

use std::sync::Arc;

use axum::Router;

use crate::{
    filters::sonarqube::{SonarQubeIssueCalculation, SonarQubeIssueFilter},
    models::REPORT_ROLES,
    require_roles,
    services::AggregationService,
    AppState,
};

use super::reports::{self, ReportDomain};

impl ReportDomain for SonarQubeIssueFilter {
    fn aggregation(state: &AppState) -> Arc<dyn AggregationService<Self>> {
        state.aggregations.sonarqube_issues.clone()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/list", reports::list_route::<SonarQubeIssueFilter>())
        .route("/values", reports::values_route::<SonarQubeIssueFilter>())
        .route(
            "/issues_report",
            reports::report_route::<SonarQubeIssueFilter>(SonarQubeIssueCalculation::IssueCount),
        )
        .route(
            "/effort_report",
            reports::report_route::<SonarQubeIssueFilter>(SonarQubeIssueCalculation::Effort),
        )
        .route_layer(require_roles!(REPORT_ROLES))
}
