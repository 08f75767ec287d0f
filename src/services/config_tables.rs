//! Config table lookup

use anyhow::Result;

use crate::db::{ConfigTableRepository, DbPool};
use crate::models::ConfigTable;

pub struct ConfigTableService {
    pool: DbPool,
}

impl ConfigTableService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, tenant: &str, id: &str) -> Result<Option<ConfigTable>> {
        ConfigTableRepository::new(&self.pool).get(tenant, id).await
    }

    pub async fn list(&self, tenant: &str) -> Result<Vec<ConfigTable>> {
        ConfigTableRepository::new(&self.pool).list(tenant).await
    }

    pub async fn save(&self, tenant: &str, table: &ConfigTable) -> Result<()> {
        ConfigTableRepository::new(&self.pool).upsert(tenant, table).await
    }
}
