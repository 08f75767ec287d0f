//! Shared report controller
//!
//! Every integration domain exposes the same list, values and aggregation
//! endpoints. The handlers here are generic over the domain filter; each
//! domain module only wires routes and picks its calculations.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{post, MethodRouter},
    Json,
};
use futures::future::try_join_all;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    filters::{row_override::apply_row, DomainFilter, Named},
    middleware::AuthUser,
    models::{AggregationResult, ConfigTable, DbListResponse, ListRequest, PaginatedResponse},
    services::AggregationService,
    utils::{validation::is_uuid, AppError, AppResult},
    AppState,
};

/// A domain filter served by one of the state's aggregation collaborators
pub trait ReportDomain: DomainFilter {
    /// Prefix of the domain's request filter keys
    const PREFIX: &'static str = "";

    fn aggregation(state: &AppState) -> Arc<dyn AggregationService<Self>>;
}

/// Query parameters accepted by every report endpoint
#[derive(Debug, Default, Deserialize)]
pub struct CacheParams {
    #[serde(default)]
    pub there_is_no_cache: bool,
}

pub fn list_route<F: ReportDomain>() -> MethodRouter<AppState> {
    post(list::<F>)
}

pub fn values_route<F: ReportDomain>() -> MethodRouter<AppState> {
    post(values::<F>)
}

/// Aggregation endpoint computing `calculation`
pub fn report_route<F: ReportDomain>(calculation: F::Calc) -> MethodRouter<AppState> {
    post(
        move |state: State<AppState>,
              user: AuthUser,
              params: Query<CacheParams>,
              body: Json<ListRequest>| async move {
            aggregate::<F>(state, user, params, body, calculation).await
        },
    )
}

/// Default-calculation aggregation restricted by the requested hygiene types
pub fn hygiene_route<F: ReportDomain>() -> MethodRouter<AppState> {
    post(hygiene::<F>)
}

async fn list<F: ReportDomain>(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<CacheParams>,
    Json(request): Json<ListRequest>,
) -> AppResult<Json<PaginatedResponse<Value>>> {
    let tenant = user.company.as_str();
    let request = state.org_units.scope(tenant, request).await;
    let mut filter = resolve_filter::<F>(&state, tenant, &request, None, None).await;

    if let Some(table_id) = config_table_id(&request)? {
        let not_found = || AppError::bad_request("Config table not found for given config_table_id");
        let table = load_table(&state, tenant, &table_id).await?.ok_or_else(not_found)?;
        let row_id = request
            .filter_str("config_table_row_id")
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(not_found)?;
        if let Some(row) = table.row(&row_id) {
            filter = apply_row(&filter, &table.schema.columns, row);
        }
    }

    let (page, page_size) = (request.page, request.page_size);
    let path = format!(
        "/{}/list_{}_{}_{}",
        F::DOMAIN,
        page,
        page_size,
        request.sort_hash()
    );
    let service = F::aggregation(&state);
    let response = cached(&state, &params, tenant, &path, &filter.cache_hash(), &filter, || {
        service.list(tenant, &filter, &request.sort, page, page_size)
    })
    .await?;

    Ok(Json(PaginatedResponse::of(page, page_size, response)))
}

async fn values<F: ReportDomain>(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<CacheParams>,
    Json(request): Json<ListRequest>,
) -> AppResult<Json<PaginatedResponse<BTreeMap<String, Vec<AggregationResult>>>>> {
    if request.fields.is_empty() {
        return Err(AppError::bad_request(
            "missing or empty list of 'fields' provided.",
        ));
    }

    let tenant = user.company.as_str();
    let request = state.org_units.scope(tenant, request).await;
    let base = resolve_filter::<F>(&state, tenant, &request, None, None)
        .await
        .values_base();
    let service = F::aggregation(&state);
    let path = format!("/{}/values", F::DOMAIN);

    let lookups = request.fields.iter().filter_map(|field| {
        let Some(across) = F::Across::parse(field) else {
            tracing::debug!(field = %field, domain = F::DOMAIN, "Skipping unknown values field");
            return None;
        };
        let filter = base.with_across(Some(across));
        let (state, params, path, service) = (&state, &params, &path, &service);
        Some(async move {
            let response = cached(state, params, tenant, path, &filter.cache_hash(), &filter, || {
                service.group_by_and_calculate(tenant, &filter, None)
            })
            .await?;
            Ok::<_, AppError>(BTreeMap::from([(field.clone(), response.records)]))
        })
    });
    let records = try_join_all(lookups).await?;

    let count = records.len() as u32;
    Ok(Json(PaginatedResponse::from_records(0, count, records)))
}

async fn hygiene<F: ReportDomain>(
    state: State<AppState>,
    user: AuthUser,
    params: Query<CacheParams>,
    Json(request): Json<ListRequest>,
) -> AppResult<Json<PaginatedResponse<AggregationResult>>> {
    let hygiene_key = format!("{}hygiene_types", F::PREFIX);
    if request.list_or_default(&hygiene_key).is_empty() {
        return Err(AppError::bad_request(
            "missing or empty list of 'hygiene_types' provided.",
        ));
    }
    aggregate::<F>(state, user, params, Json(request), F::DEFAULT_CALCULATION).await
}

async fn aggregate<F: ReportDomain>(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<CacheParams>,
    Json(request): Json<ListRequest>,
    calculation: F::Calc,
) -> AppResult<Json<PaginatedResponse<AggregationResult>>> {
    let tenant = user.company.as_str();
    let request = state.org_units.scope(tenant, request).await;
    let across = request
        .across
        .as_deref()
        .and_then(F::Across::parse)
        .unwrap_or(F::DEFAULT_ACROSS);
    let filter = resolve_filter::<F>(&state, tenant, &request, Some(calculation), Some(across)).await;
    let service = F::aggregation(&state);
    let stacks = F::Across::parse_all(&request.stacks);

    let response = if !stacks.is_empty() {
        let path = stacks_path(F::DOMAIN, &stacks);
        cached(&state, &params, tenant, &path, &filter.cache_hash(), &filter, || {
            service.stacked_group_by(tenant, &filter, &stacks, None)
        })
        .await?
    } else if let Some(table_id) = config_table_id(&request)? {
        let records = config_table_report(&state, &params, tenant, &table_id, &filter, across).await?;
        DbListResponse::from_records(records)
    } else {
        let path = format!("/{}/aggs_nonconfig", F::DOMAIN);
        cached(&state, &params, tenant, &path, &filter.cache_hash(), &filter, || {
            service.group_by_and_calculate(tenant, &filter, None)
        })
        .await?
    };

    Ok(Json(PaginatedResponse::of(request.page, request.page_size, response)))
}

/// One aggregation per config table row, keyed by the row's across value
async fn config_table_report<F: ReportDomain>(
    state: &AppState,
    params: &CacheParams,
    tenant: &str,
    table_id: &str,
    filter: &F,
    across: F::Across,
) -> AppResult<Vec<AggregationResult>> {
    let table = load_table(state, tenant, table_id)
        .await?
        .ok_or_else(|| AppError::bad_request("No Config table found for given config_table_id"))?;
    let column = table
        .column_by_key(across.as_str())
        .ok_or_else(|| AppError::bad_request("No column found for given across field"))?;
    if column.multi_value {
        return Err(AppError::bad_request("Across column should be single value"));
    }

    let service = F::aggregation(state);
    let path = format!("/{}/aggs_config", F::DOMAIN);
    let mut results = Vec::new();
    for row in table.ordered_rows() {
        let context = row.values.get(&column.id).cloned().unwrap_or_default();
        let row_filter = apply_row(filter, &table.schema.columns, row);
        let hash = format!("{}:{}", row_filter.cache_hash(), context);
        let response = cached(state, params, tenant, &path, &hash, &row_filter, || {
            service.group_by_and_calculate(tenant, &row_filter, Some(&context))
        })
        .await?;
        results.extend(response.records);
    }
    Ok(results)
}

/// Parse the request into the domain filter and pin its ingestion snapshot
async fn resolve_filter<F: ReportDomain>(
    state: &AppState,
    tenant: &str,
    request: &ListRequest,
    calculation: Option<F::Calc>,
    across: Option<F::Across>,
) -> F {
    let mut filter = F::from_request(request, F::PREFIX, calculation, across);
    if filter.base().ingested_at.is_none() {
        let ingested_at = state
            .ingestion
            .resolve_ingested_at(tenant, F::APPLICATION, &filter.base().integration_ids)
            .await;
        filter.base_mut().ingested_at = Some(ingested_at);
    }
    filter
}

/// Validated `config_table_id`; blank values count as absent
fn config_table_id(request: &ListRequest) -> AppResult<Option<String>> {
    match request.filter_str("config_table_id") {
        Some(id) if id.trim().is_empty() => Ok(None),
        Some(id) if is_uuid(&id) => Ok(Some(id)),
        Some(id) => Err(AppError::bad_request(format!(
            "Invalid config table key parameter. Required UUID. Provided: {id}"
        ))),
        None => Ok(None),
    }
}

async fn load_table(state: &AppState, tenant: &str, id: &str) -> AppResult<Option<ConfigTable>> {
    state.config_tables.get(tenant, id).await.map_err(|e| {
        tracing::error!("Failed to load config table {}: {:#}", id, e);
        AppError::internal("Failed to load config table")
    })
}

fn stacks_path<A: Named>(domain: &str, stacks: &[A]) -> String {
    let names: Vec<&str> = stacks.iter().map(|s| s.as_str()).collect();
    format!("/{}/aggs/{}", domain, names.join(","))
}

/// Run `call` through the response cache
async fn cached<F, T, C, Fut>(
    state: &AppState,
    params: &CacheParams,
    tenant: &str,
    path: &str,
    filter_hash: &str,
    filter: &F,
    call: C,
) -> AppResult<T>
where
    F: DomainFilter,
    T: Serialize + DeserializeOwned,
    C: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    state
        .cache
        .cache_or_call(
            params.there_is_no_cache,
            tenant,
            path,
            filter_hash,
            &filter.base().integration_ids,
            call,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to compute {} for tenant {}: {:#}", path, tenant, e);
            AppError::internal("Failed to compute report")
        })
}
