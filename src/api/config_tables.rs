//! Config table API endpoints (read only)

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    middleware::AuthUser,
    models::{ConfigTable, ConfigTableSummary, PaginatedResponse, READ_ROLES},
    require_roles,
    utils::{AppError, AppResult},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_config_tables))
        .route("/{id}", get(get_config_table))
        .route_layer(require_roles!(READ_ROLES))
}

async fn list_config_tables(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<PaginatedResponse<ConfigTableSummary>>> {
    let tables = state.config_tables.list(&user.company).await.map_err(|e| {
        tracing::error!("Failed to list config tables: {:#}", e);
        AppError::internal("Failed to list config tables")
    })?;

    let summaries: Vec<ConfigTableSummary> = tables.iter().map(ConfigTableSummary::from).collect();
    let count = summaries.len() as u32;
    Ok(Json(PaginatedResponse::from_records(0, count, summaries)))
}

async fn get_config_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ConfigTable>> {
    let table = state.config_tables.get(&user.company, &id).await.map_err(|e| {
        tracing::error!("Failed to load config table {}: {:#}", id, e);
        AppError::internal("Failed to load config table")
    })?;

    table
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Config table with id {id} not found.")))
}
