//! Data-access contracts, one per entity.
//!
//! Repositories hold no connection of their own: every method runs against the
//! connection handed out by a [`crate::ConnectionProvider`]. They are cheap to
//! clone so they can be moved into units of work.

use async_trait::async_trait;
use common::{NewReception, Product, Pvz, PvzId, Reception, ReceptionId, User};

use crate::error::{
    ProductRepositoryError, PvzRepositoryError, ReceptionRepositoryError, UserRepositoryError,
};
use crate::query::ProductSearch;

#[async_trait]
pub trait PvzRepository<C: Send>: Clone + Send + Sync + 'static {
    async fn create(&self, conn: &mut C, pvz: &Pvz) -> Result<(), PvzRepositoryError>;

    async fn find_all(&self, conn: &mut C) -> Result<Vec<Pvz>, PvzRepositoryError>;

    async fn find_by_ids(&self, conn: &mut C, ids: &[PvzId])
    -> Result<Vec<Pvz>, PvzRepositoryError>;
}

#[async_trait]
pub trait ReceptionRepository<C: Send>: Clone + Send + Sync + 'static {
    /// Inserts an `in_progress` reception stamped with the store's clock.
    ///
    /// Fails with a unique violation if the pickup point already has an
    /// active reception.
    async fn create(
        &self,
        conn: &mut C,
        reception: NewReception,
    ) -> Result<(), ReceptionRepositoryError>;

    /// Returns the single `in_progress` reception of a pickup point.
    async fn find_active(
        &self,
        conn: &mut C,
        pvz_id: PvzId,
    ) -> Result<Reception, ReceptionRepositoryError>;

    /// Moves an `in_progress` reception to `close`.
    async fn close(
        &self,
        conn: &mut C,
        reception_id: ReceptionId,
    ) -> Result<(), ReceptionRepositoryError>;

    async fn find_by_ids(
        &self,
        conn: &mut C,
        ids: &[ReceptionId],
    ) -> Result<Vec<Reception>, ReceptionRepositoryError>;
}

#[async_trait]
pub trait ProductRepository<C: Send>: Clone + Send + Sync + 'static {
    /// Inserts a product; refused unless its reception is `in_progress`.
    async fn create(&self, conn: &mut C, product: &Product) -> Result<(), ProductRepositoryError>;

    /// Deletes the most recently created product of an `in_progress` reception.
    async fn delete_last(
        &self,
        conn: &mut C,
        reception_id: ReceptionId,
    ) -> Result<(), ProductRepositoryError>;

    async fn search(
        &self,
        conn: &mut C,
        search: ProductSearch,
    ) -> Result<Vec<Product>, ProductRepositoryError>;
}

#[async_trait]
pub trait UserRepository<C: Send>: Clone + Send + Sync + 'static {
    async fn create(&self, conn: &mut C, user: &User) -> Result<(), UserRepositoryError>;

    async fn read_by_email(&self, conn: &mut C, email: &str) -> Result<User, UserRepositoryError>;

    async fn update_token_by_email(
        &self,
        conn: &mut C,
        email: &str,
        token: &str,
    ) -> Result<(), UserRepositoryError>;
}
