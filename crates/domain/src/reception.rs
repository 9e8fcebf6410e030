//! Reception and product lifecycle.
//!
//! A pickup point is either without an active reception or has exactly one
//! `in_progress` reception. Employees open a reception, add and remove
//! products while it is in progress, and close it. Every operation checks
//! the caller's role before anything else and touches storage only after
//! the role and the pickup point id pass.

use async_trait::async_trait;
use chrono::Utc;
use common::{NewReception, Product, ProductId, ProductType, PvzId, Reception, ReceptionId, UserRole};
use storage::{ConnectionProvider, ProductRepository, ReceptionRepository};

use crate::auth::{AuthenticatedUser, has_role};
use crate::error::{DomainError, ProductError, ReceptionError};

/// Reception lifecycle operations, as consumed by adapters.
#[async_trait]
pub trait Receptions: Send + Sync {
    /// Opens a reception at `pvz_id` and returns it as stored.
    async fn create(
        &self,
        user: Option<&AuthenticatedUser>,
        pvz_id: PvzId,
    ) -> Result<Reception, DomainError>;

    /// Adds a product to the active reception of `pvz_id`.
    async fn create_product(
        &self,
        user: Option<&AuthenticatedUser>,
        pvz_id: PvzId,
        product_type: ProductType,
    ) -> Result<Product, DomainError>;

    /// Removes the most recently added product of the active reception.
    async fn delete_last_product(
        &self,
        user: Option<&AuthenticatedUser>,
        pvz_id: PvzId,
    ) -> Result<(), DomainError>;

    /// Closes the active reception, returning it as it was before closing.
    async fn close(
        &self,
        user: Option<&AuthenticatedUser>,
        pvz_id: PvzId,
    ) -> Result<Reception, DomainError>;
}

pub struct ReceptionService<P, R, D> {
    provider: P,
    receptions: R,
    products: D,
}

impl<P, R, D> ReceptionService<P, R, D>
where
    P: ConnectionProvider,
    R: ReceptionRepository<P::Conn>,
    D: ProductRepository<P::Conn>,
{
    pub fn new(provider: P, receptions: R, products: D) -> Self {
        Self {
            provider,
            receptions,
            products,
        }
    }

    async fn find_active(&self, pvz_id: PvzId) -> storage::Result<Reception> {
        let receptions = self.receptions.clone();
        self.provider
            .execute(move |conn| {
                Box::pin(async move { Ok(receptions.find_active(conn, pvz_id).await?) })
            })
            .await
    }
}

fn authorize(user: Option<&AuthenticatedUser>) -> Result<(), DomainError> {
    if has_role(user, UserRole::Employee) {
        Ok(())
    } else {
        Err(DomainError::NotAuthorized)
    }
}

#[async_trait]
impl<P, R, D> Receptions for ReceptionService<P, R, D>
where
    P: ConnectionProvider,
    R: ReceptionRepository<P::Conn>,
    D: ProductRepository<P::Conn>,
{
    #[tracing::instrument(skip(self))]
    async fn create(
        &self,
        user: Option<&AuthenticatedUser>,
        pvz_id: PvzId,
    ) -> Result<Reception, DomainError> {
        authorize(user)?;
        if pvz_id.is_nil() {
            return Err(ReceptionError::InvalidPvzId.into());
        }

        let receptions = self.receptions.clone();
        let new_reception = NewReception {
            id: ReceptionId::new(),
            pvz_id,
        };
        self.provider
            .execute_tx(move |conn| {
                Box::pin(async move { Ok(receptions.create(conn, new_reception).await?) })
            })
            .await
            .map_err(ReceptionError::Create)?;

        // Read back to pick up the store-assigned timestamp.
        let reception = self
            .find_active(pvz_id)
            .await
            .map_err(ReceptionError::CreateFindActive)?;

        metrics::counter!("receptions_created_total").increment(1);
        tracing::info!(reception_id = %reception.id, "reception opened");
        Ok(reception)
    }

    #[tracing::instrument(skip(self))]
    async fn create_product(
        &self,
        user: Option<&AuthenticatedUser>,
        pvz_id: PvzId,
        product_type: ProductType,
    ) -> Result<Product, DomainError> {
        authorize(user)?;
        if pvz_id.is_nil() {
            return Err(ProductError::InvalidPvzId.into());
        }

        let reception = self
            .find_active(pvz_id)
            .await
            .map_err(ProductError::CreateFindActive)?;

        let product = Product {
            id: ProductId::new(),
            reception_id: reception.id,
            product_type,
            created_at: Utc::now(),
        };
        let products = self.products.clone();
        let insert = product.clone();
        self.provider
            .execute_tx(move |conn| {
                Box::pin(async move { Ok(products.create(conn, &insert).await?) })
            })
            .await
            .map_err(ProductError::Create)?;

        metrics::counter!("products_created_total").increment(1);
        tracing::debug!(product_id = %product.id, reception_id = %reception.id, "product added");
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_last_product(
        &self,
        user: Option<&AuthenticatedUser>,
        pvz_id: PvzId,
    ) -> Result<(), DomainError> {
        authorize(user)?;
        if pvz_id.is_nil() {
            return Err(ProductError::InvalidPvzId.into());
        }

        let reception = self
            .find_active(pvz_id)
            .await
            .map_err(ProductError::DeleteFindActive)?;

        let products = self.products.clone();
        let reception_id = reception.id;
        self.provider
            .execute_tx(move |conn| {
                Box::pin(async move { Ok(products.delete_last(conn, reception_id).await?) })
            })
            .await
            .map_err(ProductError::Delete)?;

        metrics::counter!("products_deleted_total").increment(1);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn close(
        &self,
        user: Option<&AuthenticatedUser>,
        pvz_id: PvzId,
    ) -> Result<Reception, DomainError> {
        authorize(user)?;
        if pvz_id.is_nil() {
            return Err(ReceptionError::InvalidPvzId.into());
        }

        let reception = self
            .find_active(pvz_id)
            .await
            .map_err(ReceptionError::CloseFindActive)?;

        let receptions = self.receptions.clone();
        let reception_id = reception.id;
        self.provider
            .execute_tx(move |conn| {
                Box::pin(async move { Ok(receptions.close(conn, reception_id).await?) })
            })
            .await
            .map_err(ReceptionError::Close)?;

        metrics::counter!("receptions_closed_total").increment(1);
        tracing::info!(reception_id = %reception.id, "reception closed");
        Ok(reception)
    }
}
