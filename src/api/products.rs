//! Product (workspace) API endpoints
//!
//! Mounted at both `/v1/products` and `/v1/org/workspaces`.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    middleware::AuthUser,
    models::{
        value_as_i64, ActivityAction, BulkDeleteResponse, DeleteResponse, ListRequest,
        NewActivityLog, PaginatedResponse, Product, ProductQuery, ProductRequest, TargetItemType,
        PRODUCT_CREATE_ROLES, PRODUCT_READ_ROLES, WRITE_ROLES,
    },
    require_roles,
    utils::{AppError, AppResult},
    AppState,
};

const LABEL: &str = "Products item";

pub fn routes() -> Router<AppState> {
    let reads = Router::new()
        .route("/{id}", get(get_product))
        .route("/list", post(list_products))
        .route_layer(require_roles!(PRODUCT_READ_ROLES));

    let create = Router::new()
        .route("/", post(create_product))
        .route_layer(require_roles!(PRODUCT_CREATE_ROLES));

    let writes = Router::new()
        .route("/", axum::routing::delete(bulk_delete_products))
        .route("/{id}", axum::routing::put(update_product))
        .route("/{id}/disable", patch(disable_product))
        .route_layer(require_roles!(WRITE_ROLES));

    reads.merge(create).merge(writes)
}

#[derive(Debug, Deserialize)]
struct DisableParams {
    #[serde(default)]
    disabled: bool,
}

fn activity(action: ActivityAction, id: &str, user: &AuthUser) -> NewActivityLog {
    NewActivityLog::new(TargetItemType::Product, action, LABEL, id, &user.email)
}

async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ProductRequest>,
) -> AppResult<Json<Value>> {
    let id = state.products.create(&user.company, &request).await?;

    let entry = activity(ActivityAction::Created, &id, &user).with_details(json!({ "item": &request }));
    state.activity_log.record(&user.company, entry).await;

    Ok(Json(json!({ "id": id })))
}

async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.products.get(&user.company, &id).await?))
}

async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<ProductRequest>,
) -> AppResult<Json<Value>> {
    let (before, after) = state.products.update(&user.company, &id, &request).await?;

    let entry = activity(ActivityAction::Edited, &id, &user).with_details(json!({ "item": &after }));
    state
        .activity_log
        .record_edit(&user.company, entry, &before, &after)
        .await;

    Ok(Json(json!({ "id": id })))
}

async fn disable_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Query(params): Query<DisableParams>,
) -> AppResult<Json<DeleteResponse>> {
    let response = state
        .products
        .set_disabled(&user.company, &id, params.disabled)
        .await?;

    let verb = if params.disabled { "Disabled" } else { "Enabled" };
    let mut entry = activity(ActivityAction::Edited, &id, &user)
        .with_details(json!({ "disabled": params.disabled }));
    entry.body = format!("{verb} {LABEL}: {id}");
    state.activity_log.record(&user.company, entry).await;

    Ok(Json(response))
}

async fn bulk_delete_products(
    State(state): State<AppState>,
    user: AuthUser,
    Json(ids): Json<Vec<String>>,
) -> Json<BulkDeleteResponse> {
    let response = state.products.bulk_delete(&user.company, &ids).await;
    for deleted in response.records.iter().filter(|r| r.success) {
        let entry = activity(ActivityAction::Deleted, &deleted.id, &user);
        state.activity_log.record(&user.company, entry).await;
    }
    Json(response)
}

async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ListRequest>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    let query = product_query(&request);
    let response = state.products.list(&user.company, &query).await.map_err(|e| {
        tracing::error!("Failed to list products: {:#}", e);
        AppError::internal("Failed to list products")
    })?;
    Ok(Json(PaginatedResponse::of(request.page, request.page_size, response)))
}

fn product_query(request: &ListRequest) -> ProductQuery {
    ProductQuery {
        partial_name: request.partial_str("name"),
        product_ids: request
            .filter
            .get("product_ids")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(value_as_i64).collect())
            .unwrap_or_default(),
        keys: string_or_list(request, "key"),
        owner_ids: string_or_list(request, "owner_id"),
        immutable: request.filter_bool("immutable"),
        disabled: request.filter_bool("disabled"),
        updated_at: request.time_range("updated_at"),
        page: request.page,
        page_size: request.page_size,
    }
}

/// A filter entry given either as a single value or a list
fn string_or_list(request: &ListRequest, key: &str) -> Vec<String> {
    match request.filter_str(key) {
        Some(value) => vec![value],
        None => request.list_or_default(key),
    }
}
