//! Jira issue report endpoints

use std::sync::Arc;

use axum::Router;

use crate::{
    filters::jira::{JiraIssueCalculation as Calc, JiraIssuesFilter},
    models::REPORT_ROLES,
    require_roles,
    services::AggregationService,
    AppState,
};

use super::reports::{self, ReportDomain};

impl ReportDomain for JiraIssuesFilter {
    fn aggregation(state: &AppState) -> Arc<dyn AggregationService<Self>> {
        state.aggregations.jira_issues.clone()
    }
}

pub fn routes() -> Router<AppState> {
    let report = reports::report_route::<JiraIssuesFilter>;
    Router::new()
        .route("/list", reports::list_route::<JiraIssuesFilter>())
        .route("/values", reports::values_route::<JiraIssuesFilter>())
        .route("/tickets_report", report(Calc::TicketCount))
        .route("/resolution_time_report", report(Calc::ResolutionTime))
        .route("/hops_report", report(Calc::Hops))
        .route("/bounce_report", report(Calc::Bounces))
        .route("/age_report", report(Calc::Age))
        .route("/story_point_report", report(Calc::StoryPoints))
        .route_layer(require_roles!(REPORT_ROLES))
}
