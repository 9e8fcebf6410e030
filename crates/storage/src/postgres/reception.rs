use async_trait::async_trait;
use common::{NewReception, PvzId, Reception, ReceptionId, ReceptionStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use super::decode_text;
use crate::error::{DbError, ReceptionRepositoryError};
use crate::repository::ReceptionRepository;

const SELECT_RECEPTION: &str = "SELECT id, pvz_id, status, created_at FROM receptions";

#[derive(Debug, Clone, Copy, Default)]
pub struct PgReceptionRepository;

impl PgReceptionRepository {
    pub fn new() -> Self {
        Self
    }

    fn row_to_reception(row: PgRow) -> Result<Reception, sqlx::Error> {
        Ok(Reception {
            id: ReceptionId::from_uuid(row.try_get::<Uuid, _>("id")?),
            pvz_id: PvzId::from_uuid(row.try_get::<Uuid, _>("pvz_id")?),
            status: decode_text(&row, "status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl ReceptionRepository<PgConnection> for PgReceptionRepository {
    async fn create(
        &self,
        conn: &mut PgConnection,
        reception: NewReception,
    ) -> Result<(), ReceptionRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO receptions (id, pvz_id, status, created_at)
            VALUES ($1, $2, $3, DEFAULT)
            "#,
        )
        .bind(reception.id.as_uuid())
        .bind(reception.pvz_id.as_uuid())
        .bind(ReceptionStatus::InProgress.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| ReceptionRepositoryError::Create(e.into()))?;

        Ok(())
    }

    async fn find_active(
        &self,
        conn: &mut PgConnection,
        pvz_id: PvzId,
    ) -> Result<Reception, ReceptionRepositoryError> {
        let row = sqlx::query(&format!("{SELECT_RECEPTION} WHERE pvz_id = $1 AND status = $2"))
            .bind(pvz_id.as_uuid())
            .bind(ReceptionStatus::InProgress.as_str())
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| ReceptionRepositoryError::FindActive(e.into()))?;

        Self::row_to_reception(row).map_err(|e| ReceptionRepositoryError::FindActive(e.into()))
    }

    async fn close(
        &self,
        conn: &mut PgConnection,
        reception_id: ReceptionId,
    ) -> Result<(), ReceptionRepositoryError> {
        let result = sqlx::query("UPDATE receptions SET status = $2 WHERE id = $1 AND status = $3")
            .bind(reception_id.as_uuid())
            .bind(ReceptionStatus::Close.as_str())
            .bind(ReceptionStatus::InProgress.as_str())
            .execute(&mut *conn)
            .await
            .map_err(|e| ReceptionRepositoryError::Close(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(ReceptionRepositoryError::Close(DbError::NotFound));
        }
        Ok(())
    }

    async fn find_by_ids(
        &self,
        conn: &mut PgConnection,
        ids: &[ReceptionId],
    ) -> Result<Vec<Reception>, ReceptionRepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(ReceptionId::as_uuid).collect();

        let rows = sqlx::query(&format!("{SELECT_RECEPTION} WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| ReceptionRepositoryError::FindByIds(e.into()))?;

        rows.into_iter()
            .map(Self::row_to_reception)
            .collect::<Result<_, _>>()
            .map_err(|e| ReceptionRepositoryError::FindByIds(e.into()))
    }
}
