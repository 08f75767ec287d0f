//! Zendesk ticket report endpoints

use std::sync::Arc;

use axum::Router;

use crate::{
    filters::zendesk::{ZendeskTicketCalculation as Calc, ZendeskTicketFilter},
    models::REPORT_ROLES,
    require_roles,
    services::AggregationService,
    AppState,
};

use super::reports::{self, ReportDomain};

impl ReportDomain for ZendeskTicketFilter {
    fn aggregation(state: &AppState) -> Arc<dyn AggregationService<Self>> {
        state.aggregations.zendesk_tickets.clone()
    }
}

pub fn routes() -> Router<AppState> {
    let report = reports::report_route::<ZendeskTicketFilter>;
    Router::new()
        .route("/list", reports::list_route::<ZendeskTicketFilter>())
        .route("/values", reports::values_route::<ZendeskTicketFilter>())
        .route("/bounce_report", report(Calc::Bounces))
        .route("/hops_report", report(Calc::Hops))
        .route("/response_time_report", report(Calc::ResponseTime))
        .route("/resolution_time_report", report(Calc::ResolutionTime))
        .route("/agent_wait_time_report", report(Calc::AgentWaitTime))
        .route("/requester_wait_time_report", report(Calc::RequesterWaitTime))
        .route("/reopens_report", report(Calc::Reopens))
        .route("/replies_report", report(Calc::Replies))
        .route("/tickets_report", report(Calc::TicketCount))
        .route("/hygiene_report", reports::hygiene_route::<ZendeskTicketFilter>())
        .route_layer(require_roles!(REPORT_ROLES))
}
