//! Playbook (runbook) lifecycle
//!
//! Handles revisioned updates: a changed node graph creates a new revision
//! and disables the previous one, any other change patches the latest
//! revision in place.

use anyhow::Result;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{DbPool, RunbookRepository};
use crate::models::{
    BulkDeleteResponse, DbListResponse, DeleteResponse, Runbook, RunbookPatch, RunbookPayload,
    RunbookPermanentDeleteResponse, RunbookQuery, RunbookUpdateResponse,
};
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum PlaybookError {
    #[error("ui_data cannot be null.")]
    MissingUiData,

    #[error("Runbook id provided does not match request")]
    IdMismatch,

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to persist updated playbook")]
    PersistFailed,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<PlaybookError> for AppError {
    fn from(err: PlaybookError) -> Self {
        match err {
            PlaybookError::MissingUiData | PlaybookError::IdMismatch => {
                AppError::bad_request(err.to_string())
            }
            PlaybookError::NotFound(message) => AppError::not_found(message),
            PlaybookError::PersistFailed => AppError::internal(err.to_string()),
            PlaybookError::Storage(e) => {
                tracing::error!("Playbook storage error: {:#}", e);
                AppError::internal("Failed to access playbooks")
            }
        }
    }
}

/// How an update addresses the playbook
#[derive(Debug, Clone, Copy)]
pub enum RevisionRef<'a> {
    Id(&'a str),
    PermanentId(&'a str),
}

/// Outcome of an update together with the revision it started from
#[derive(Debug, Clone)]
pub struct RunbookUpdate {
    pub response: RunbookUpdateResponse,
    pub before: Runbook,
}

pub struct RunbookService {
    pool: DbPool,
}

impl RunbookService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tenant: &str, payload: RunbookPayload) -> Result<Runbook, PlaybookError> {
        if payload.ui_data.is_none() {
            return Err(PlaybookError::MissingUiData);
        }

        let now = Utc::now();
        let runbook = Runbook {
            id: Uuid::new_v4().to_string(),
            previous_id: None,
            permanent_id: Uuid::new_v4().to_string(),
            nodes: payload.nodes(),
            name: payload.name.unwrap_or_default(),
            description: payload.description,
            enabled: payload.enabled.unwrap_or(false),
            trigger_type: payload.trigger_type,
            trigger_data: payload.trigger_data,
            ui_data: payload.ui_data,
            settings: payload.settings,
            created_at: now,
            updated_at: now,
        };
        RunbookRepository::new(&self.pool).insert(tenant, &runbook).await?;

        info!(tenant = %tenant, id = %runbook.id, "Created playbook");
        Ok(runbook)
    }

    pub async fn get(&self, tenant: &str, id: &str) -> Result<Runbook, PlaybookError> {
        RunbookRepository::new(&self.pool)
            .get(tenant, id)
            .await?
            .ok_or_else(|| PlaybookError::NotFound(format!("Could not find Runbook with id={id}")))
    }

    pub async fn get_latest_by_permanent_id(
        &self,
        tenant: &str,
        permanent_id: &str,
    ) -> Result<Runbook, PlaybookError> {
        RunbookRepository::new(&self.pool)
            .get_latest_by_permanent_id(tenant, permanent_id)
            .await?
            .ok_or_else(|| {
                PlaybookError::NotFound(format!(
                    "Could not find Runbook with permanent id={permanent_id}"
                ))
            })
    }

    pub async fn update(
        &self,
        tenant: &str,
        target: RevisionRef<'_>,
        payload: RunbookPayload,
    ) -> Result<RunbookUpdate, PlaybookError> {
        let repo = RunbookRepository::new(&self.pool);

        let current = match target {
            RevisionRef::Id(id) => {
                if payload.id.as_deref().is_some_and(|body_id| body_id != id) {
                    return Err(PlaybookError::IdMismatch);
                }
                match repo.get_latest_revision_id(tenant, id).await? {
                    Some(latest) => repo.get(tenant, &latest).await?,
                    None => None,
                }
            }
            RevisionRef::PermanentId(permanent_id) => {
                repo.get_latest_by_permanent_id(tenant, permanent_id).await?
            }
        };
        let current = current.ok_or_else(|| {
            let id = match target {
                RevisionRef::Id(id) | RevisionRef::PermanentId(id) => id,
            };
            PlaybookError::NotFound(format!("Could not find playbook with id={id}"))
        })?;

        if payload.nodes_dirty.unwrap_or(false) {
            return self.create_revision(tenant, current, payload).await;
        }

        let patch = RunbookPatch::diff(&current, &payload);
        if patch.is_empty() {
            return Ok(RunbookUpdate {
                response: RunbookUpdateResponse {
                    id: current.id.clone(),
                    previous_id: None,
                    permanent_id: current.permanent_id.clone(),
                    updated: false,
                },
                before: current,
            });
        }

        if !repo.update(tenant, &current.id, &patch).await? {
            return Err(PlaybookError::PersistFailed);
        }

        Ok(RunbookUpdate {
            response: RunbookUpdateResponse {
                id: current.id.clone(),
                previous_id: None,
                permanent_id: current.permanent_id.clone(),
                updated: true,
            },
            before: current,
        })
    }

    async fn create_revision(
        &self,
        tenant: &str,
        current: Runbook,
        payload: RunbookPayload,
    ) -> Result<RunbookUpdate, PlaybookError> {
        let repo = RunbookRepository::new(&self.pool);
        let now = Utc::now();
        let revision = Runbook {
            id: Uuid::new_v4().to_string(),
            previous_id: Some(current.id.clone()),
            permanent_id: current.permanent_id.clone(),
            nodes: payload.nodes().or_else(|| current.nodes.clone()),
            name: payload.name.unwrap_or_else(|| current.name.clone()),
            description: payload.description.or_else(|| current.description.clone()),
            enabled: payload.enabled.unwrap_or(current.enabled),
            trigger_type: payload.trigger_type.or_else(|| current.trigger_type.clone()),
            trigger_data: payload.trigger_data.or_else(|| current.trigger_data.clone()),
            ui_data: payload.ui_data.or_else(|| current.ui_data.clone()),
            settings: payload.settings.or_else(|| current.settings.clone()),
            created_at: now,
            updated_at: now,
        };
        if !repo.insert_revision(tenant, &revision, &current.id).await? {
            return Err(PlaybookError::PersistFailed);
        }

        info!(
            tenant = %tenant,
            id = %revision.id,
            previous_id = %current.id,
            "Created playbook revision"
        );
        Ok(RunbookUpdate {
            response: RunbookUpdateResponse {
                id: revision.id,
                previous_id: Some(current.id.clone()),
                permanent_id: revision.permanent_id,
                updated: true,
            },
            before: current,
        })
    }

    /// Delete a revision and its predecessors, reporting failure in the body
    pub async fn delete(&self, tenant: &str, id: &str) -> DeleteResponse {
        match RunbookRepository::new(&self.pool)
            .delete_with_previous_revisions(tenant, id)
            .await
        {
            Ok(true) => DeleteResponse::success(id),
            Ok(false) => DeleteResponse::failure(id, format!("Could not find playbook with id={id}")),
            Err(e) => {
                warn!(tenant = %tenant, id = %id, error = %e, "Failed to delete playbook");
                DeleteResponse::failure(id, e.to_string())
            }
        }
    }

    /// Delete each id independently; one failure never stops the others
    pub async fn bulk_delete(&self, tenant: &str, ids: &[String]) -> BulkDeleteResponse {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push(self.delete(tenant, id).await);
        }
        BulkDeleteResponse::of(records)
    }

    pub async fn delete_by_permanent_id(
        &self,
        tenant: &str,
        permanent_id: &str,
    ) -> Result<RunbookPermanentDeleteResponse, PlaybookError> {
        let repo = RunbookRepository::new(&self.pool);
        let latest = repo
            .get_latest_by_permanent_id(tenant, permanent_id)
            .await?
            .ok_or_else(|| {
                PlaybookError::NotFound(format!(
                    "Could not find any playbook to delete using permanentId={permanent_id}"
                ))
            })?;

        let deleted = repo.delete_with_previous_revisions(tenant, &latest.id).await?;
        Ok(RunbookPermanentDeleteResponse {
            permanent_id: permanent_id.to_string(),
            deleted,
        })
    }

    pub async fn list(&self, tenant: &str, query: &RunbookQuery) -> Result<DbListResponse<Runbook>> {
        RunbookRepository::new(&self.pool).list(tenant, query).await
    }
}
