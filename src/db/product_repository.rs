//! Product (workspace) repository

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::{page_bounds, parse_db_timestamp, placeholders};
use crate::models::{DbListResponse, Product, ProductQuery, ProductRequest};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    key: String,
    description: Option<String>,
    owner_id: Option<String>,
    integration_ids: String,
    immutable: bool,
    disabled: bool,
    bootstrapped: bool,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str = "id, name, key, description, owner_id, integration_ids, immutable, disabled, \
                       bootstrapped, created_at, updated_at";

pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a validated product and return its id
    pub async fn insert(&self, tenant: &str, product: &ProductRequest) -> Result<String> {
        let now = Utc::now().to_rfc3339();
        let integration_ids =
            serde_json::to_string(&product.integration_ids.clone().unwrap_or_default())?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (tenant, name, key, description, owner_id, integration_ids, immutable, disabled, bootstrapped, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(tenant)
        .bind(product.name.as_deref().map(str::trim))
        .bind(product.key.as_deref().map(str::trim))
        .bind(&product.description)
        .bind(&product.owner_id)
        .bind(integration_ids)
        .bind(product.immutable.unwrap_or(false))
        .bind(product.disabled.unwrap_or(false))
        .bind(product.bootstrapped.unwrap_or(false))
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .context("Failed to insert product")?;

        Ok(id.to_string())
    }

    pub async fn get(&self, tenant: &str, id: &str) -> Result<Option<Product>> {
        let Ok(id) = id.parse::<i64>() else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM products WHERE tenant = ? AND id = ?"
        ))
        .bind(tenant)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch product")?;

        Ok(row.map(row_to_product))
    }

    /// Update the fields present in `update`; false when nothing matched
    pub async fn update(&self, tenant: &str, id: &str, update: &ProductRequest) -> Result<bool> {
        let id: i64 = id.parse().context("Invalid product id")?;
        let mut sets: Vec<&str> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(ref name) = update.name {
            sets.push("name = ?");
            binds.push(name.trim().to_string());
        }
        if let Some(ref key) = update.key {
            sets.push("key = ?");
            binds.push(key.trim().to_string());
        }
        if let Some(ref description) = update.description {
            sets.push("description = ?");
            binds.push(description.clone());
        }
        if let Some(ref owner_id) = update.owner_id {
            sets.push("owner_id = ?");
            binds.push(owner_id.clone());
        }
        if let Some(ref integration_ids) = update.integration_ids {
            sets.push("integration_ids = ?");
            binds.push(serde_json::to_string(integration_ids)?);
        }
        if let Some(disabled) = update.disabled {
            sets.push("disabled = ?");
            binds.push(if disabled { "1" } else { "0" }.to_string());
        }
        sets.push("updated_at = ?");
        binds.push(Utc::now().to_rfc3339());

        let sql = format!(
            "UPDATE products SET {} WHERE tenant = ? AND id = ?",
            sets.join(", ")
        );
        let mut q = sqlx::query(&sql);
        for value in binds {
            q = q.bind(value);
        }
        let result = q
            .bind(tenant)
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to update product")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every id or none of them
    ///
    /// Fails when any id is unknown or read-only.
    pub async fn bulk_delete(&self, tenant: &str, ids: &[String]) -> Result<()> {
        let numeric_ids = ids
            .iter()
            .map(|id| {
                id.trim()
                    .parse::<i64>()
                    .map_err(|_| anyhow!("Product with id {} not found.", id))
            })
            .collect::<Result<Vec<i64>>>()?;
        if numeric_ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.context("Failed to start transaction")?;

        let sql = format!(
            "SELECT id, immutable FROM products WHERE tenant = ? AND id IN ({})",
            placeholders(numeric_ids.len())
        );
        let mut q = sqlx::query_as::<_, (i64, bool)>(&sql).bind(tenant);
        for id in &numeric_ids {
            q = q.bind(id);
        }
        let existing = q
            .fetch_all(&mut *tx)
            .await
            .context("Failed to load products for delete")?;

        for id in &numeric_ids {
            match existing.iter().find(|(existing_id, _)| existing_id == id) {
                None => bail!("Product with id {} not found.", id),
                Some((_, true)) => bail!("Cannot remove read-only project."),
                Some(_) => {}
            }
        }

        let sql = format!(
            "DELETE FROM products WHERE tenant = ? AND id IN ({})",
            placeholders(numeric_ids.len())
        );
        let mut q = sqlx::query(&sql).bind(tenant);
        for id in &numeric_ids {
            q = q.bind(id);
        }
        q.execute(&mut *tx).await.context("Failed to delete products")?;

        tx.commit().await.context("Failed to commit product delete")?;
        Ok(())
    }

    pub async fn list(&self, tenant: &str, query: &ProductQuery) -> Result<DbListResponse<Product>> {
        let mut conditions = String::from(" WHERE tenant = ?");
        let mut binds: Vec<String> = vec![tenant.to_string()];

        if let Some(ref name) = query.partial_name {
            conditions.push_str(" AND LOWER(name) LIKE ?");
            binds.push(format!("%{}%", name.to_lowercase()));
        }
        if !query.product_ids.is_empty() {
            conditions.push_str(&format!(" AND id IN ({})", placeholders(query.product_ids.len())));
            binds.extend(query.product_ids.iter().map(|id| id.to_string()));
        }
        if !query.keys.is_empty() {
            conditions.push_str(&format!(" AND key IN ({})", placeholders(query.keys.len())));
            binds.extend(query.keys.iter().cloned());
        }
        if !query.owner_ids.is_empty() {
            conditions.push_str(&format!(" AND owner_id IN ({})", placeholders(query.owner_ids.len())));
            binds.extend(query.owner_ids.iter().cloned());
        }
        if let Some(immutable) = query.immutable {
            conditions.push_str(" AND immutable = ?");
            binds.push(if immutable { "1" } else { "0" }.to_string());
        }
        if let Some(disabled) = query.disabled {
            conditions.push_str(" AND disabled = ?");
            binds.push(if disabled { "1" } else { "0" }.to_string());
        }
        if let Some(range) = query.updated_at {
            if let Some(gt) = range.gt.and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)) {
                conditions.push_str(" AND updated_at > ?");
                binds.push(gt.to_rfc3339());
            }
            if let Some(lt) = range.lt.and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)) {
                conditions.push_str(" AND updated_at < ?");
                binds.push(lt.to_rfc3339());
            }
        }

        let count_sql = format!("SELECT COUNT(*) FROM products{conditions}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count_query = count_query.bind(value);
        }
        let total = count_query
            .fetch_one(self.pool)
            .await
            .context("Failed to count products")?;

        let sql = format!("SELECT {COLUMNS} FROM products{conditions} ORDER BY id LIMIT ? OFFSET ?");
        let (limit, offset) = page_bounds(query.page, query.page_size);
        let mut q = sqlx::query_as::<_, ProductRow>(&sql);
        for value in &binds {
            q = q.bind(value);
        }
        let rows = q
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .context("Failed to list products")?;

        Ok(DbListResponse::of(
            rows.into_iter().map(row_to_product).collect(),
            total as usize,
        ))
    }
}

fn row_to_product(row: ProductRow) -> Product {
    Product {
        id: row.id.to_string(),
        name: row.name,
        key: row.key,
        description: row.description,
        owner_id: row.owner_id,
        integration_ids: serde_json::from_str(&row.integration_ids).unwrap_or_default(),
        immutable: row.immutable,
        disabled: row.disabled,
        bootstrapped: row.bootstrapped,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
