//! Activity log API endpoints

use axum::{extract::State, routing::post, Json, Router};

use crate::{
    middleware::AuthUser,
    models::{
        ActivityAction, ActivityLog, ActivityLogQuery, ListRequest, PaginatedResponse,
        TargetItemType, AUDIT_ROLES,
    },
    require_roles,
    utils::{AppError, AppResult},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/list", post(list_activity_logs))
        .route_layer(require_roles!(AUDIT_ROLES))
}

async fn list_activity_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ListRequest>,
) -> AppResult<Json<PaginatedResponse<ActivityLog>>> {
    let query = activity_log_query(&request);
    let response = state
        .activity_log
        .list(&user.company, &query)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list activity logs: {:#}", e);
            AppError::internal("Failed to list activity logs")
        })?;

    Ok(Json(PaginatedResponse::of(request.page, request.page_size, response)))
}

fn activity_log_query(request: &ListRequest) -> ActivityLogQuery {
    ActivityLogQuery {
        target_items: request.list_or_default("target_items"),
        target_item_types: request
            .list_or_default("target_item_types")
            .iter()
            .filter_map(|t| TargetItemType::parse(t))
            .collect(),
        actions: request
            .list_or_default("actions")
            .iter()
            .filter_map(|a| ActivityAction::parse(a))
            .collect(),
        emails: request.list_or_default("emails"),
        page: request.page,
        page_size: request.page_size,
    }
}
