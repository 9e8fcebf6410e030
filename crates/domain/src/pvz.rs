//! Pickup point registration and the nested listing search.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    City, Product, Pvz, PvzId, PvzReceptions, Reception, ReceptionId, ReceptionProducts, UserRole,
};
use storage::{
    ConnectionProvider, ProductRepository, ProductRepositoryError, ProductSearch, PvzRepository,
    ReceptionRepository, StorageError,
};

use crate::auth::{AuthenticatedUser, has_role};
use crate::error::{DomainError, PvzError};

#[async_trait]
pub trait Pvzs: Send + Sync {
    /// Registers a pickup point. Moderators only.
    async fn create(&self, user: Option<&AuthenticatedUser>, city: City)
    -> Result<Pvz, DomainError>;

    async fn find_all(&self) -> Result<Vec<Pvz>, DomainError>;

    /// Lists pickup points with the receptions and products whose products
    /// were created within `[from, to]`, paginated over products.
    async fn find_pvz_reception_products(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<PvzReceptions>, DomainError>;
}

pub struct PvzService<P, V, R, D> {
    provider: P,
    pvzs: V,
    receptions: R,
    products: D,
}

impl<P, V, R, D> PvzService<P, V, R, D>
where
    P: ConnectionProvider,
    V: PvzRepository<P::Conn>,
    R: ReceptionRepository<P::Conn>,
    D: ProductRepository<P::Conn>,
{
    pub fn new(provider: P, pvzs: V, receptions: R, products: D) -> Self {
        Self {
            provider,
            pvzs,
            receptions,
            products,
        }
    }

    async fn search_products(&self, search: ProductSearch) -> storage::Result<Vec<Product>> {
        let products = self.products.clone();
        self.provider
            .execute(move |conn| {
                Box::pin(async move { Ok(products.search(conn, search).await?) })
            })
            .await
    }

    async fn receptions_by_ids(&self, ids: Vec<ReceptionId>) -> storage::Result<Vec<Reception>> {
        let receptions = self.receptions.clone();
        self.provider
            .execute(move |conn| {
                Box::pin(async move { Ok(receptions.find_by_ids(conn, &ids).await?) })
            })
            .await
    }

    async fn pvzs_by_ids(&self, ids: Vec<PvzId>) -> storage::Result<Vec<Pvz>> {
        let pvzs = self.pvzs.clone();
        self.provider
            .execute(move |conn| Box::pin(async move { Ok(pvzs.find_by_ids(conn, &ids).await?) }))
            .await
    }
}

#[async_trait]
impl<P, V, R, D> Pvzs for PvzService<P, V, R, D>
where
    P: ConnectionProvider,
    V: PvzRepository<P::Conn>,
    R: ReceptionRepository<P::Conn>,
    D: ProductRepository<P::Conn>,
{
    #[tracing::instrument(skip(self))]
    async fn create(
        &self,
        user: Option<&AuthenticatedUser>,
        city: City,
    ) -> Result<Pvz, DomainError> {
        if !has_role(user, UserRole::Moderator) {
            return Err(DomainError::NotAuthorized);
        }

        let pvz = Pvz {
            id: PvzId::new(),
            city,
            registered_at: Utc::now(),
        };
        let pvzs = self.pvzs.clone();
        let insert = pvz.clone();
        self.provider
            .execute_tx(move |conn| Box::pin(async move { Ok(pvzs.create(conn, &insert).await?) }))
            .await
            .map_err(PvzError::Create)?;

        metrics::counter!("pvz_created_total").increment(1);
        tracing::info!(pvz_id = %pvz.id, city = %pvz.city, "pvz registered");
        Ok(pvz)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Pvz>, DomainError> {
        let pvzs = self.pvzs.clone();
        let all = self
            .provider
            .execute(move |conn| Box::pin(async move { Ok(pvzs.find_all(conn).await?) }))
            .await
            .map_err(PvzError::FindAll)?;
        Ok(all)
    }

    #[tracing::instrument(skip(self))]
    async fn find_pvz_reception_products(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<PvzReceptions>, DomainError> {
        let search = ProductSearch::new(from, to, page, limit).map_err(|e| {
            PvzError::SearchProducts(StorageError::Product(ProductRepositoryError::from(e)))
        })?;

        let products = self
            .search_products(search)
            .await
            .map_err(PvzError::SearchProducts)?;

        let reception_ids = distinct(products.iter().map(|p| p.reception_id));
        let receptions = self
            .receptions_by_ids(reception_ids)
            .await
            .map_err(PvzError::SearchReceptions)?;

        let pvz_ids = distinct(receptions.iter().map(|r| r.pvz_id));
        let pvzs = self
            .pvzs_by_ids(pvz_ids)
            .await
            .map_err(PvzError::SearchPvzs)?;

        tracing::debug!(
            products = products.len(),
            receptions = receptions.len(),
            pvzs = pvzs.len(),
            "search stages complete"
        );
        Ok(assemble(products, receptions, pvzs))
    }
}

/// Unique values in first-seen order.
fn distinct<T: Copy + Eq + Hash>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

/// Joins the three search stages into the nested listing.
///
/// Output follows the order of `pvzs`; within a pickup point, receptions and
/// products keep their input order. Rows referencing something outside the
/// given sets are dropped.
pub fn assemble(
    products: Vec<Product>,
    receptions: Vec<Reception>,
    pvzs: Vec<Pvz>,
) -> Vec<PvzReceptions> {
    let mut products_by_reception: HashMap<ReceptionId, Vec<Product>> = HashMap::new();
    for product in products {
        products_by_reception
            .entry(product.reception_id)
            .or_default()
            .push(product);
    }

    let mut receptions_by_pvz: HashMap<PvzId, Vec<ReceptionProducts>> = HashMap::new();
    for reception in receptions {
        let products = products_by_reception
            .remove(&reception.id)
            .unwrap_or_default();
        receptions_by_pvz
            .entry(reception.pvz_id)
            .or_default()
            .push(ReceptionProducts {
                reception,
                products,
            });
    }

    pvzs.into_iter()
        .map(|pvz| PvzReceptions {
            receptions: receptions_by_pvz.remove(&pvz.id).unwrap_or_default(),
            pvz,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use common::{ProductId, ProductType, ReceptionStatus};

    use super::*;

    fn pvz() -> Pvz {
        Pvz {
            id: PvzId::new(),
            city: City::Moscow,
            registered_at: Utc::now(),
        }
    }

    fn reception(pvz_id: PvzId, status: ReceptionStatus) -> Reception {
        Reception {
            id: ReceptionId::new(),
            pvz_id,
            status,
            created_at: Utc::now(),
        }
    }

    fn product(reception_id: ReceptionId, created_at: DateTime<Utc>) -> Product {
        Product {
            id: ProductId::new(),
            reception_id,
            product_type: ProductType::Clothes,
            created_at,
        }
    }

    #[test]
    fn groups_products_under_their_reception() {
        let now = Utc::now();
        let x = pvz();
        let r1 = reception(x.id, ReceptionStatus::Close);
        let r2 = reception(x.id, ReceptionStatus::InProgress);
        let p1 = product(r1.id, now - Duration::hours(2));
        let p2 = product(r1.id, now);

        let result = assemble(
            vec![p1.clone(), p2.clone()],
            vec![r1.clone(), r2.clone()],
            vec![x.clone()],
        );

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].pvz, x);
        assert_eq!(result[0].receptions.len(), 2);
        assert_eq!(result[0].receptions[0].reception, r1);
        assert_eq!(result[0].receptions[0].products, vec![p1, p2]);
        assert_eq!(result[0].receptions[1].reception, r2);
        assert!(result[0].receptions[1].products.is_empty());
    }

    #[test]
    fn follows_pvz_lookup_order() {
        let a = pvz();
        let b = pvz();
        let ra = reception(a.id, ReceptionStatus::Close);
        let rb = reception(b.id, ReceptionStatus::Close);
        let products = vec![product(ra.id, Utc::now()), product(rb.id, Utc::now())];

        let result = assemble(products, vec![ra, rb], vec![b.clone(), a.clone()]);

        let order: Vec<PvzId> = result.iter().map(|g| g.pvz.id).collect();
        assert_eq!(order, vec![b.id, a.id]);
    }

    #[test]
    fn pvz_without_matching_receptions_is_kept_empty() {
        let lonely = pvz();
        let result = assemble(vec![], vec![], vec![lonely.clone()]);
        assert_eq!(result.len(), 1);
        assert!(result[0].receptions.is_empty());
    }

    #[test]
    fn distinct_keeps_first_occurrence_order() {
        let a = ReceptionId::new();
        let b = ReceptionId::new();
        assert_eq!(distinct([a, b, a, b, a].into_iter()), vec![a, b]);
    }
}
