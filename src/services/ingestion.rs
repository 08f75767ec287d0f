//! Ingestion snapshot resolution

use chrono::Utc;
use tracing::warn;

use crate::db::{DbPool, IntegrationRepository};

pub struct IngestionService {
    pool: DbPool,
}

impl IngestionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Latest ingestion timestamp of the first `application` integration
    /// among `integration_ids`, or today's midnight UTC
    pub async fn resolve_ingested_at(
        &self,
        tenant: &str,
        application: &str,
        integration_ids: &[String],
    ) -> i64 {
        match self.latest(tenant, application, integration_ids).await {
            Ok(Some(ingested_at)) => ingested_at,
            Ok(None) => today_midnight(),
            Err(e) => {
                warn!(
                    tenant = %tenant,
                    application = %application,
                    error = %e,
                    "Failed to resolve ingested_at, using today"
                );
                today_midnight()
            }
        }
    }

    async fn latest(
        &self,
        tenant: &str,
        application: &str,
        integration_ids: &[String],
    ) -> anyhow::Result<Option<i64>> {
        let repo = IntegrationRepository::new(&self.pool);
        let integrations = repo
            .list_by_application(tenant, application, integration_ids)
            .await?;
        match integrations.first() {
            Some(integration) => repo.latest_ingested_at(tenant, &integration.id).await,
            None => Ok(None),
        }
    }
}

/// Epoch seconds of the current day at 00:00 UTC
pub fn today_midnight() -> i64 {
    let now = Utc::now().timestamp();
    now - now.rem_euclid(86_400)
}
