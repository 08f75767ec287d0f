//! Product (workspace) management

use anyhow::Result;
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

use crate::db::{DbPool, ProductRepository};
use crate::models::{
    BulkDeleteResponse, DbListResponse, DeleteResponse, Product, ProductQuery, ProductRequest,
};
use crate::utils::validation::{validate_product_key, validate_product_name};
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Invalid(message) => AppError::bad_request(message),
            ProductError::NotFound(message) => AppError::not_found(message),
            ProductError::Conflict(message) => AppError::conflict(message),
            ProductError::Validation(e) => e.into(),
            ProductError::Storage(e) => {
                tracing::error!("Product storage error: {:#}", e);
                AppError::internal("Failed to access products")
            }
        }
    }
}

const DISABLED_FIELD_MESSAGE: &str = "Updating the disabled field is not allowed through this \
                                      endpoint. Please use the /disabled endpoint instead.";

/// Name and key checks; on update only the fields present are checked
pub fn validate_request(request: &ProductRequest, creating: bool) -> Result<(), ProductError> {
    request.validate()?;

    if creating || request.name.is_some() {
        let name = request.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ProductError::Invalid(
                "Workspace name cannot be null or empty or blank.".to_string(),
            ));
        }
        if !validate_product_name(name) {
            return Err(ProductError::Invalid(format!(
                "Workspace name should contain only 'a-z A-Z 0-9 -_' or space. Input: {name}"
            )));
        }
    }

    if creating || request.key.is_some() {
        let key = request.key.as_deref().map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(ProductError::Invalid(
                "Workspace key cannot be null or empty or blank.".to_string(),
            ));
        }
        if !validate_product_key(key) {
            return Err(ProductError::Invalid(format!(
                "Workspace key should contain only 'a-z A-Z 0-9 -_'. Input: {key}"
            )));
        }
    }

    Ok(())
}

/// Map unique constraint failures to the conflicting field
fn conflict_or_storage(err: anyhow::Error) -> ProductError {
    if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
        let message = db_err.message();
        if message.contains("products.key") {
            return ProductError::Conflict("Key already exists".to_string());
        }
        if message.contains("products.name") {
            return ProductError::Conflict("Name already exists".to_string());
        }
    }
    ProductError::Storage(err)
}

pub struct ProductService {
    pool: DbPool,
}

impl ProductService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tenant: &str, request: &ProductRequest) -> Result<String, ProductError> {
        validate_request(request, true)?;

        let id = ProductRepository::new(&self.pool)
            .insert(tenant, request)
            .await
            .map_err(conflict_or_storage)?;

        info!(tenant = %tenant, id = %id, "Created product");
        Ok(id)
    }

    pub async fn get(&self, tenant: &str, id: &str) -> Result<Product, ProductError> {
        ProductRepository::new(&self.pool)
            .get(tenant, id)
            .await?
            .ok_or_else(|| ProductError::NotFound(format!("Product with id {id} not found.")))
    }

    /// Update a product, returning its state before and after
    pub async fn update(
        &self,
        tenant: &str,
        id: &str,
        request: &ProductRequest,
    ) -> Result<(Product, Product), ProductError> {
        validate_request(request, false)?;

        let before = self.get(tenant, id).await?;
        if request.disabled.is_some_and(|disabled| disabled != before.disabled) {
            return Err(ProductError::Invalid(DISABLED_FIELD_MESSAGE.to_string()));
        }

        let update = ProductRequest {
            disabled: None,
            ..request.clone()
        };
        let updated = ProductRepository::new(&self.pool)
            .update(tenant, id, &update)
            .await
            .map_err(conflict_or_storage)?;
        if !updated {
            return Err(ProductError::NotFound(format!("Product with id {id} not found.")));
        }

        let after = self.get(tenant, id).await?;
        Ok((before, after))
    }

    pub async fn set_disabled(
        &self,
        tenant: &str,
        id: &str,
        disabled: bool,
    ) -> Result<DeleteResponse, ProductError> {
        let product = self.get(tenant, id).await?;
        if product.immutable {
            return Err(ProductError::Invalid("Cannot disable read-only project.".to_string()));
        }

        let update = ProductRequest {
            disabled: Some(disabled),
            ..Default::default()
        };
        ProductRepository::new(&self.pool).update(tenant, id, &update).await?;

        info!(tenant = %tenant, id = %id, disabled, "Changed product disabled state");
        Ok(DeleteResponse::success(id))
    }

    /// Delete all ids in one transaction; any failure fails every id
    pub async fn bulk_delete(&self, tenant: &str, ids: &[String]) -> BulkDeleteResponse {
        match ProductRepository::new(&self.pool).bulk_delete(tenant, ids).await {
            Ok(()) => BulkDeleteResponse::uniform(ids, true, None),
            Err(e) => {
                warn!(tenant = %tenant, error = %e, "Product bulk delete rejected");
                BulkDeleteResponse::uniform(ids, false, Some(e.to_string()))
            }
        }
    }

    pub async fn list(&self, tenant: &str, query: &ProductQuery) -> Result<DbListResponse<Product>> {
        ProductRepository::new(&self.pool).list(tenant, query).await
    }
}
