//! Integration tests for pickup point registration and the nested search.

mod support;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::{
    City, NewReception, Product, ProductId, ProductType, Pvz, PvzId, Reception, ReceptionId,
};
use domain::{DomainError, ErrorKind, PvzError, PvzService, Pvzs};
use storage::{
    ConnectionProvider, DbError, MemoryConnection, MemoryProductRepository, MemoryProvider,
    MemoryPvzRepository, MemoryReceptionRepository, ProductRepository, PvzRepository,
    ReceptionRepository, ReceptionRepositoryError,
};

use support::{employee, moderator, points, provider};

mod registration {
    use super::*;

    // PVZ registration is restricted to moderators.
    #[tokio::test]
    async fn create_pvz_requires_moderator() {
        let provider = provider();
        let service = points(&provider);

        let err = service
            .create(Some(&employee()), City::Moscow)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotAuthorized));

        let err = service.create(None, City::Moscow).await.unwrap_err();
        assert!(matches!(err, DomainError::NotAuthorized));

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn created_pvz_is_listed() {
        let provider = provider();
        let service = points(&provider);

        let created = service
            .create(Some(&moderator()), City::Kazan)
            .await
            .unwrap();
        let all = service.find_all().await.unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0], created);
        assert_eq!(all[0].city, City::Kazan);
        assert!(!all[0].id.is_nil());
    }
}

/// Seeds the join scenario: products P1 (R1, now-2h) and P2 (R1, now),
/// receptions R1 (X, closed) and R2 (X, in progress), pickup point X.
async fn seed_join_scenario(provider: &MemoryProvider) -> (Pvz, ReceptionId, ReceptionId, Vec<ProductId>) {
    let now = Utc::now();
    let x = Pvz {
        id: PvzId::new(),
        city: City::Moscow,
        registered_at: now - Duration::days(1),
    };
    let r1 = ReceptionId::new();
    let r2 = ReceptionId::new();
    let p1 = Product {
        id: ProductId::new(),
        reception_id: r1,
        product_type: ProductType::Electronics,
        created_at: now - Duration::hours(2),
    };
    let p2 = Product {
        id: ProductId::new(),
        reception_id: r1,
        product_type: ProductType::Shoes,
        created_at: now,
    };
    let product_ids = vec![p1.id, p2.id];
    let point = x.clone();

    provider
        .execute_tx(move |conn| {
            Box::pin(async move {
                MemoryPvzRepository.create(conn, &point).await?;
                MemoryReceptionRepository
                    .create(conn, NewReception { id: r1, pvz_id: point.id })
                    .await?;
                MemoryProductRepository.create(conn, &p1).await?;
                MemoryProductRepository.create(conn, &p2).await?;
                MemoryReceptionRepository.close(conn, r1).await?;
                MemoryReceptionRepository
                    .create(conn, NewReception { id: r2, pvz_id: point.id })
                    .await?;
                Ok(())
            })
        })
        .await
        .unwrap();

    (x, r1, r2, product_ids)
}

mod search {
    use super::*;

    #[tokio::test]
    async fn joins_products_receptions_and_pvzs() {
        let memory = MemoryProvider::new();
        let (x, r1, _r2, product_ids) = seed_join_scenario(&memory).await;
        let service = PvzService::new(
            memory,
            MemoryPvzRepository,
            MemoryReceptionRepository,
            MemoryProductRepository,
        );

        let result = service
            .find_pvz_reception_products(None, None, None, None)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].pvz, x);
        // Only receptions referenced by a matching product are fetched.
        assert_eq!(result[0].receptions.len(), 1);
        assert_eq!(result[0].receptions[0].reception.id, r1);
        let ids: Vec<ProductId> = result[0].receptions[0]
            .products
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, product_ids);
    }

    #[tokio::test]
    async fn time_window_narrows_products() {
        let memory = MemoryProvider::new();
        let (_, _, _, product_ids) = seed_join_scenario(&memory).await;
        let service = PvzService::new(
            memory,
            MemoryPvzRepository,
            MemoryReceptionRepository,
            MemoryProductRepository,
        );

        let from = Utc::now() - Duration::hours(1);
        let result = service
            .find_pvz_reception_products(Some(from), None, None, None)
            .await
            .unwrap();

        let ids: Vec<ProductId> = result[0].receptions[0]
            .products
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![product_ids[1]]);
    }

    #[tokio::test]
    async fn empty_store_yields_empty_listing() {
        let provider = provider();
        let result = points(&provider)
            .find_pvz_reception_products(None, None, Some(0), Some(10))
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn invalid_parameters_are_validation_errors() {
        let provider = provider();
        let service = points(&provider);
        let now = Utc::now();

        let err = service
            .find_pvz_reception_products(Some(now), Some(now - Duration::hours(1)), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let message = err.to_string();
        assert!(message.contains("search failed"));
        assert!(message.contains("from must be less than to"));

        let err = service
            .find_pvz_reception_products(None, None, Some(-1), Some(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid page"));

        let err = service
            .find_pvz_reception_products(None, None, Some(1), Some(0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid limit"));

        let err = service
            .find_pvz_reception_products(None, None, Some(1), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("page without limit"));

        assert_eq!(provider.calls(), 0);
    }
}

/// Reception repository whose id lookup always fails.
#[derive(Debug, Clone, Copy, Default)]
struct BrokenLookupReceptions;

#[async_trait]
impl ReceptionRepository<MemoryConnection> for BrokenLookupReceptions {
    async fn create(
        &self,
        conn: &mut MemoryConnection,
        reception: NewReception,
    ) -> Result<(), ReceptionRepositoryError> {
        MemoryReceptionRepository.create(conn, reception).await
    }

    async fn find_active(
        &self,
        conn: &mut MemoryConnection,
        pvz_id: PvzId,
    ) -> Result<Reception, ReceptionRepositoryError> {
        MemoryReceptionRepository.find_active(conn, pvz_id).await
    }

    async fn close(
        &self,
        conn: &mut MemoryConnection,
        reception_id: ReceptionId,
    ) -> Result<(), ReceptionRepositoryError> {
        MemoryReceptionRepository.close(conn, reception_id).await
    }

    async fn find_by_ids(
        &self,
        _conn: &mut MemoryConnection,
        _ids: &[ReceptionId],
    ) -> Result<Vec<Reception>, ReceptionRepositoryError> {
        Err(ReceptionRepositoryError::FindByIds(DbError::Driver(
            sqlx::Error::Protocol("connection reset by peer".to_string()),
        )))
    }
}

#[tokio::test]
async fn reception_stage_failure_names_the_stage() {
    let memory = MemoryProvider::new();
    seed_join_scenario(&memory).await;
    let service = PvzService::new(
        memory,
        MemoryPvzRepository,
        BrokenLookupReceptions,
        MemoryProductRepository,
    );

    let err = service
        .find_pvz_reception_products(None, None, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Pvz(PvzError::SearchReceptions(_))));
    assert_eq!(err.kind(), ErrorKind::Storage);
    let message = err.to_string();
    assert!(message.contains("search receptions failed"));
    assert!(message.contains("connection reset by peer"));
}
