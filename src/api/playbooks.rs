//! Playbook API endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    middleware::AuthUser,
    models::{
        ActivityAction, BulkDeleteResponse, DeleteResponse, ListRequest, NewActivityLog,
        PaginatedResponse, Runbook, RunbookPayload, RunbookPermanentDeleteResponse, RunbookQuery,
        RunbookUpdateResponse, TargetItemType, READ_ROLES, WRITE_ROLES,
    },
    require_roles,
    services::{RevisionRef, RunbookUpdate},
    utils::{AppError, AppResult},
    AppState,
};

const LABEL: &str = "Playbook";

pub fn routes() -> Router<AppState> {
    let reads = Router::new()
        .route("/{id}", get(get_playbook))
        .route("/permanent-id/{id}", get(get_playbook_by_permanent_id))
        .route("/list", post(list_playbooks))
        .route_layer(require_roles!(READ_ROLES));

    let writes = Router::new()
        .route("/", post(create_playbook).delete(bulk_delete_playbooks))
        .route("/{id}", put(update_playbook).delete(delete_playbook))
        .route(
            "/permanent-id/{id}",
            put(update_playbook_by_permanent_id).delete(delete_playbook_by_permanent_id),
        )
        .route_layer(require_roles!(WRITE_ROLES));

    reads.merge(writes)
}

fn activity(action: ActivityAction, id: &str, user: &AuthUser) -> NewActivityLog {
    NewActivityLog::new(TargetItemType::Playbook, action, LABEL, id, &user.email)
}

async fn create_playbook(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RunbookPayload>,
) -> AppResult<Json<Value>> {
    let runbook = state.runbooks.create(&user.company, payload).await?;

    let entry = activity(ActivityAction::Created, &runbook.id, &user)
        .with_details(json!({ "item": &runbook }));
    state.activity_log.record(&user.company, entry).await;

    Ok(Json(json!({
        "id": runbook.id,
        "permanent_id": runbook.permanent_id,
    })))
}

async fn get_playbook(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Runbook>> {
    Ok(Json(state.runbooks.get(&user.company, &id.to_string()).await?))
}

async fn get_playbook_by_permanent_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(permanent_id): Path<Uuid>,
) -> AppResult<Json<Runbook>> {
    let runbook = state
        .runbooks
        .get_latest_by_permanent_id(&user.company, &permanent_id.to_string())
        .await?;
    Ok(Json(runbook))
}

async fn update_playbook(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RunbookPayload>,
) -> AppResult<Json<RunbookUpdateResponse>> {
    let id = id.to_string();
    let update = state
        .runbooks
        .update(&user.company, RevisionRef::Id(&id), payload)
        .await?;
    Ok(Json(log_update(&state, &user, update).await))
}

async fn update_playbook_by_permanent_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(permanent_id): Path<Uuid>,
    Json(payload): Json<RunbookPayload>,
) -> AppResult<Json<RunbookUpdateResponse>> {
    let permanent_id = permanent_id.to_string();
    let update = state
        .runbooks
        .update(&user.company, RevisionRef::PermanentId(&permanent_id), payload)
        .await?;
    Ok(Json(log_update(&state, &user, update).await))
}

/// Record an EDITED entry for updates that changed something
async fn log_update(state: &AppState, user: &AuthUser, update: RunbookUpdate) -> RunbookUpdateResponse {
    let RunbookUpdate { response, before } = update;
    if !response.updated {
        return response;
    }

    let entry = activity(ActivityAction::Edited, &response.id, user);
    match state.runbooks.get(&user.company, &response.id).await {
        Ok(after) => {
            let entry = entry.with_details(json!({ "item": &after }));
            state
                .activity_log
                .record_edit(&user.company, entry, &before, &after)
                .await;
        }
        Err(e) => {
            tracing::warn!("Failed to reload playbook {} for activity log: {}", response.id, e);
            state.activity_log.record(&user.company, entry).await;
        }
    }
    response
}

async fn delete_playbook(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Json<DeleteResponse> {
    let response = state.runbooks.delete(&user.company, &id.to_string()).await;
    if response.success {
        let entry = activity(ActivityAction::Deleted, &response.id, &user);
        state.activity_log.record(&user.company, entry).await;
    }
    Json(response)
}

async fn bulk_delete_playbooks(
    State(state): State<AppState>,
    user: AuthUser,
    Json(ids): Json<Vec<Uuid>>,
) -> Json<BulkDeleteResponse> {
    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    let response = state.runbooks.bulk_delete(&user.company, &ids).await;
    for deleted in response.records.iter().filter(|r| r.success) {
        let entry = activity(ActivityAction::Deleted, &deleted.id, &user);
        state.activity_log.record(&user.company, entry).await;
    }
    Json(response)
}

async fn delete_playbook_by_permanent_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(permanent_id): Path<Uuid>,
) -> AppResult<Json<RunbookPermanentDeleteResponse>> {
    let response = state
        .runbooks
        .delete_by_permanent_id(&user.company, &permanent_id.to_string())
        .await?;
    if response.deleted {
        let entry = activity(ActivityAction::Deleted, &response.permanent_id, &user);
        state.activity_log.record(&user.company, entry).await;
    }
    Ok(Json(response))
}

async fn list_playbooks(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ListRequest>,
) -> AppResult<Json<PaginatedResponse<Runbook>>> {
    let query = runbook_query(&request);
    let mut response = state.runbooks.list(&user.company, &query).await.map_err(|e| {
        tracing::error!("Failed to list playbooks: {:#}", e);
        AppError::internal("Failed to list playbooks")
    })?;
    for runbook in &mut response.records {
        runbook.nodes = None;
    }
    Ok(Json(PaginatedResponse::of(request.page, request.page_size, response)))
}

fn runbook_query(request: &ListRequest) -> RunbookQuery {
    let runbook_ids = request.list_or_default("runbook_ids");
    let only_latest_revision = request
        .filter_bool("only_latest_revision")
        .unwrap_or(runbook_ids.is_empty());
    RunbookQuery {
        partial_name: request.partial_str("name"),
        enabled: request.filter_bool("enabled"),
        trigger_type: request.filter_str("trigger_type"),
        permanent_ids: request.list_or_default("permanent_ids"),
        runbook_ids,
        only_latest_revision,
        page: request.page,
        page_size: request.page_size,
    }
}
