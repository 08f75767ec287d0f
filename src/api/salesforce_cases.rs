//! Salesforce case report endpoints

use std::sync::Arc;

use axum::Router;

use crate::{
    filters::salesforce::{SalesforceCaseCalculation, SalesforceCaseFilter},
    models::REPORT_ROLES,
    require_roles,
    services::AggregationService,
    AppState,
};

use super::reports::{self, ReportDomain};

impl ReportDomain for SalesforceCaseFilter {
    fn aggregation(state: &AppState) -> Arc<dyn AggregationService<Self>> {
        state.aggregations.salesforce_cases.clone()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/list", reports::list_route::<SalesforceCaseFilter>())
        .route("/values", reports::values_route::<SalesforceCaseFilter>())
        .route(
            "/bounce_report",
            reports::report_route::<SalesforceCaseFilter>(SalesforceCaseCalculation::Bounces),
        )
        .route(
            "/hops_report",
            reports::report_route::<SalesforceCaseFilter>(SalesforceCaseCalculation::Hops),
        )
        .route(
            "/cases_report",
            reports::report_route::<SalesforceCaseFilter>(SalesforceCaseCalculation::CaseCount),
        )
        .route(
            "/resolution_time_report",
            reports::report_route::<SalesforceCaseFilter>(SalesforceCaseCalculation::ResolutionTime),
        )
        .route("/hygiene_report", reports::hygiene_route::<SalesforceCaseFilter>())
        .route_layer(require_roles!(REPORT_ROLES))
}
