//! Org unit scoping of report requests

use tracing::warn;

use crate::db::{DbPool, OrgUnitRepository};
use crate::models::ListRequest;

pub struct OrgUnitService {
    pool: DbPool,
}

impl OrgUnitService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Apply the first requested org unit to `request`
    ///
    /// Failures are logged and the request is returned unchanged.
    pub async fn scope(&self, tenant: &str, request: ListRequest) -> ListRequest {
        let Some(ou_id) = request.ou_ids.first().cloned() else {
            return request;
        };

        match OrgUnitRepository::new(&self.pool).get(tenant, &ou_id).await {
            Ok(Some(unit)) => {
                let mut scoped = request;
                if scoped.list_or_default("integration_ids").is_empty()
                    && !unit.integration_ids.is_empty()
                {
                    scoped
                        .filter
                        .insert("integration_ids".to_string(), unit.integration_ids.into());
                }
                for (key, value) in unit.default_filters {
                    scoped.filter.entry(key).or_insert(value);
                }
                scoped
            }
            Ok(None) => {
                warn!(tenant = %tenant, ou_id = %ou_id, "Org unit not found, ignoring scope");
                request
            }
            Err(e) => {
                warn!(tenant = %tenant, ou_id = %ou_id, error = %e, "Failed to load org unit");
                request
            }
        }
    }
}
