//! In-memory provider and repositories.
//!
//! Mirrors the PostgreSQL schema closely enough to exercise the services
//! without a database: primary keys, foreign keys, the one-active-reception
//! index and the conditional product writes are all enforced here too.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{
    NewReception, Product, Pvz, PvzId, Reception, ReceptionId, ReceptionStatus, User,
};
use tokio::sync::Mutex;

use crate::error::{
    DbError, ProductRepositoryError, PvzRepositoryError, ReceptionRepositoryError,
    UserRepositoryError,
};
use crate::provider::{ConnectionProvider, UnitFuture};
use crate::query::ProductSearch;
use crate::repository::{PvzRepository, ProductRepository, ReceptionRepository, UserRepository};

/// Row storage shared by all memory connections of one provider.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pvz: Vec<Pvz>,
    receptions: Vec<Reception>,
    products: Vec<Product>,
    users: Vec<User>,
}

impl Tables {
    fn reception_mut(&mut self, id: ReceptionId) -> Option<&mut Reception> {
        self.receptions.iter_mut().find(|r| r.id == id)
    }

    fn is_in_progress(&self, id: ReceptionId) -> bool {
        self.receptions
            .iter()
            .any(|r| r.id == id && r.status.is_active())
    }
}

/// Connection handed to units run through a [`MemoryProvider`].
#[derive(Debug)]
pub struct MemoryConnection {
    tables: Tables,
}

/// Connection provider backed by process memory.
///
/// Units are serialized. A transactional unit works on a copy of the tables
/// that replaces the shared state only when the unit succeeds, so a failing
/// unit leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryProvider {
    /// Creates a provider over empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows per table as `(pvz, receptions, products, users)`.
    pub async fn row_counts(&self) -> (usize, usize, usize, usize) {
        let tables = self.tables.lock().await;
        (
            tables.pvz.len(),
            tables.receptions.len(),
            tables.products.len(),
            tables.users.len(),
        )
    }

    /// Removes every row.
    pub async fn clear(&self) {
        *self.tables.lock().await = Tables::default();
    }
}

#[async_trait]
impl ConnectionProvider for MemoryProvider {
    type Conn = MemoryConnection;

    async fn execute<T, F>(&self, unit: F) -> crate::Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static,
    {
        let mut shared = self.tables.lock().await;
        let mut conn = MemoryConnection {
            tables: shared.clone(),
        };
        let result = unit(&mut conn).await;
        // Outside a transaction every statement commits on its own.
        *shared = conn.tables;
        result
    }

    async fn execute_tx<T, F>(&self, unit: F) -> crate::Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static,
    {
        let mut shared = self.tables.lock().await;
        let mut conn = MemoryConnection {
            tables: shared.clone(),
        };
        let value = unit(&mut conn).await?;
        *shared = conn.tables;
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryPvzRepository;

#[async_trait]
impl PvzRepository<MemoryConnection> for MemoryPvzRepository {
    async fn create(&self, conn: &mut MemoryConnection, pvz: &Pvz) -> Result<(), PvzRepositoryError> {
        let tables = &mut conn.tables;
        if tables.pvz.iter().any(|p| p.id == pvz.id) {
            return Err(PvzRepositoryError::Create(DbError::UniqueViolation(
                "pvz_pkey".to_string(),
            )));
        }
        tables.pvz.push(pvz.clone());
        Ok(())
    }

    async fn find_all(&self, conn: &mut MemoryConnection) -> Result<Vec<Pvz>, PvzRepositoryError> {
        let mut pvzs = conn.tables.pvz.clone();
        pvzs.sort_by_key(|p| p.registered_at);
        Ok(pvzs)
    }

    async fn find_by_ids(
        &self,
        conn: &mut MemoryConnection,
        ids: &[PvzId],
    ) -> Result<Vec<Pvz>, PvzRepositoryError> {
        let wanted: HashSet<_> = ids.iter().collect();
        Ok(conn
            .tables
            .pvz
            .iter()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryReceptionRepository;

#[async_trait]
impl ReceptionRepository<MemoryConnection> for MemoryReceptionRepository {
    async fn create(
        &self,
        conn: &mut MemoryConnection,
        reception: NewReception,
    ) -> Result<(), ReceptionRepositoryError> {
        let tables = &mut conn.tables;
        let violation = if tables.receptions.iter().any(|r| r.id == reception.id) {
            Some(DbError::UniqueViolation("receptions_pkey".to_string()))
        } else if !tables.pvz.iter().any(|p| p.id == reception.pvz_id) {
            Some(DbError::ForeignKeyViolation(
                "receptions_pvz_id_fkey".to_string(),
            ))
        } else if tables
            .receptions
            .iter()
            .any(|r| r.pvz_id == reception.pvz_id && r.status.is_active())
        {
            Some(DbError::UniqueViolation(
                "receptions_one_in_progress_per_pvz".to_string(),
            ))
        } else {
            None
        };
        if let Some(err) = violation {
            return Err(ReceptionRepositoryError::Create(err));
        }

        tables.receptions.push(Reception {
            id: reception.id,
            pvz_id: reception.pvz_id,
            status: ReceptionStatus::InProgress,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn find_active(
        &self,
        conn: &mut MemoryConnection,
        pvz_id: PvzId,
    ) -> Result<Reception, ReceptionRepositoryError> {
        conn.tables
            .receptions
            .iter()
            .find(|r| r.pvz_id == pvz_id && r.status.is_active())
            .cloned()
            .ok_or(ReceptionRepositoryError::FindActive(DbError::NotFound))
    }

    async fn close(
        &self,
        conn: &mut MemoryConnection,
        reception_id: ReceptionId,
    ) -> Result<(), ReceptionRepositoryError> {
        match conn.tables.reception_mut(reception_id) {
            Some(reception) if reception.status.is_active() => {
                reception.status = ReceptionStatus::Close;
                Ok(())
            }
            _ => Err(ReceptionRepositoryError::Close(DbError::NotFound)),
        }
    }

    async fn find_by_ids(
        &self,
        conn: &mut MemoryConnection,
        ids: &[ReceptionId],
    ) -> Result<Vec<Reception>, ReceptionRepositoryError> {
        let wanted: HashSet<_> = ids.iter().collect();
        Ok(conn
            .tables
            .receptions
            .iter()
            .filter(|r| wanted.contains(&r.id))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryProductRepository;

#[async_trait]
impl ProductRepository<MemoryConnection> for MemoryProductRepository {
    async fn create(
        &self,
        conn: &mut MemoryConnection,
        product: &Product,
    ) -> Result<(), ProductRepositoryError> {
        let tables = &mut conn.tables;
        if tables.products.iter().any(|p| p.id == product.id) {
            return Err(ProductRepositoryError::Create(DbError::UniqueViolation(
                "products_pkey".to_string(),
            )));
        }
        if !tables.is_in_progress(product.reception_id) {
            return Err(ProductRepositoryError::Create(DbError::NotFound));
        }
        tables.products.push(product.clone());
        Ok(())
    }

    async fn delete_last(
        &self,
        conn: &mut MemoryConnection,
        reception_id: ReceptionId,
    ) -> Result<(), ProductRepositoryError> {
        let tables = &mut conn.tables;
        if !tables.is_in_progress(reception_id) {
            return Err(ProductRepositoryError::DeleteLast(DbError::NotFound));
        }

        // Equal timestamps fall back to the larger id, matching Postgres.
        let newest = tables
            .products
            .iter()
            .enumerate()
            .filter(|(_, p)| p.reception_id == reception_id)
            .max_by_key(|(_, p)| (p.created_at, p.id))
            .map(|(index, _)| index);

        match newest {
            Some(index) => {
                tables.products.remove(index);
                Ok(())
            }
            None => Err(ProductRepositoryError::DeleteLast(DbError::NotFound)),
        }
    }

    async fn search(
        &self,
        conn: &mut MemoryConnection,
        search: ProductSearch,
    ) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut products: Vec<Product> = conn
            .tables
            .products
            .iter()
            .filter(|p| search.matches(p.created_at))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.created_at);

        let offset = usize::try_from(search.offset().unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = search
            .limit()
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        Ok(products.into_iter().skip(offset).take(limit).collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryUserRepository;

#[async_trait]
impl UserRepository<MemoryConnection> for MemoryUserRepository {
    async fn create(&self, conn: &mut MemoryConnection, user: &User) -> Result<(), UserRepositoryError> {
        let tables = &mut conn.tables;
        let violation = if tables.users.iter().any(|u| u.id == user.id) {
            Some("users_pkey")
        } else if tables.users.iter().any(|u| u.email == user.email) {
            Some("users_email_key")
        } else {
            None
        };
        if let Some(constraint) = violation {
            return Err(UserRepositoryError::Create(DbError::UniqueViolation(
                constraint.to_string(),
            )));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn read_by_email(
        &self,
        conn: &mut MemoryConnection,
        email: &str,
    ) -> Result<User, UserRepositoryError> {
        conn.tables
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(UserRepositoryError::ReadByEmail(DbError::NotFound))
    }

    async fn update_token_by_email(
        &self,
        conn: &mut MemoryConnection,
        email: &str,
        token: &str,
    ) -> Result<(), UserRepositoryError> {
        match conn.tables.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.token = token.to_string();
                Ok(())
            }
            None => Err(UserRepositoryError::UpdateTokenByEmail(DbError::NotFound)),
        }
    }
}
