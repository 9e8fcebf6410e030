use async_trait::async_trait;
use common::{Product, ProductId, ReceptionId, ReceptionStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use super::decode_text;
use crate::error::{DbError, ProductRepositoryError, SearchError};
use crate::query::ProductSearch;
use crate::repository::ProductRepository;

#[derive(Debug, Clone, Copy, Default)]
pub struct PgProductRepository;

impl PgProductRepository {
    pub fn new() -> Self {
        Self
    }

    fn row_to_product(row: PgRow) -> Result<Product, sqlx::Error> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            reception_id: ReceptionId::from_uuid(row.try_get::<Uuid, _>("reception_id")?),
            product_type: decode_text(&row, "type")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn search_failed(err: sqlx::Error) -> ProductRepositoryError {
    ProductRepositoryError::Search(SearchError::Db(err.into()))
}

#[async_trait]
impl ProductRepository<PgConnection> for PgProductRepository {
    async fn create(
        &self,
        conn: &mut PgConnection,
        product: &Product,
    ) -> Result<(), ProductRepositoryError> {
        // Conditional insert: a closed or unknown reception inserts nothing.
        // The share lock makes a concurrent close wait for this insert, or
        // this insert observe the closed status.
        let result = sqlx::query(
            r#"
            INSERT INTO products (id, reception_id, type, created_at)
            SELECT $1, $2, $3, $4
            WHERE EXISTS (
                SELECT 1 FROM receptions WHERE id = $2 AND status = $5 FOR SHARE
            )
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.reception_id.as_uuid())
        .bind(product.product_type.as_str())
        .bind(product.created_at)
        .bind(ReceptionStatus::InProgress.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| ProductRepositoryError::Create(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(ProductRepositoryError::Create(DbError::NotFound));
        }
        Ok(())
    }

    async fn delete_last(
        &self,
        conn: &mut PgConnection,
        reception_id: ReceptionId,
    ) -> Result<(), ProductRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM products
            WHERE id = (
                SELECT p.id
                FROM products p
                JOIN receptions r ON r.id = p.reception_id
                WHERE p.reception_id = $1 AND r.status = $2
                ORDER BY p.created_at DESC, p.id DESC
                LIMIT 1
                FOR SHARE OF r
            )
            "#,
        )
        .bind(reception_id.as_uuid())
        .bind(ReceptionStatus::InProgress.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| ProductRepositoryError::DeleteLast(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(ProductRepositoryError::DeleteLast(DbError::NotFound));
        }
        Ok(())
    }

    async fn search(
        &self,
        conn: &mut PgConnection,
        search: ProductSearch,
    ) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut sql = String::from("SELECT id, reception_id, type, created_at FROM products");
        let mut conditions = Vec::new();
        let mut param_count = 0;

        if search.from().is_some() {
            param_count += 1;
            conditions.push(format!("created_at >= ${param_count}"));
        }
        if search.to().is_some() {
            param_count += 1;
            conditions.push(format!("created_at <= ${param_count}"));
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(" ORDER BY created_at ASC");

        if search.limit().is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if search.offset().is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut query = sqlx::query(&sql);
        if let Some(from) = search.from() {
            query = query.bind(from);
        }
        if let Some(to) = search.to() {
            query = query.bind(to);
        }
        if let Some(limit) = search.limit() {
            query = query.bind(limit);
        }
        if let Some(offset) = search.offset() {
            query = query.bind(offset);
        }

        let rows = query.fetch_all(&mut *conn).await.map_err(search_failed)?;

        rows.into_iter()
            .map(Self::row_to_product)
            .collect::<Result<_, _>>()
            .map_err(search_failed)
    }
}
