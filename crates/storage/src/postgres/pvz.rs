use async_trait::async_trait;
use common::{Pvz, PvzId};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use super::decode_text;
use crate::error::{DbError, PvzRepositoryError};
use crate::repository::PvzRepository;

#[derive(Debug, Clone, Copy, Default)]
pub struct PgPvzRepository;

impl PgPvzRepository {
    pub fn new() -> Self {
        Self
    }

    fn row_to_pvz(row: PgRow) -> Result<Pvz, sqlx::Error> {
        Ok(Pvz {
            id: PvzId::from_uuid(row.try_get::<Uuid, _>("id")?),
            city: decode_text(&row, "city")?,
            registered_at: row.try_get("registered_at")?,
        })
    }

    fn rows_to_pvzs(rows: Vec<PgRow>) -> Result<Vec<Pvz>, DbError> {
        rows.into_iter()
            .map(Self::row_to_pvz)
            .collect::<Result<_, _>>()
            .map_err(DbError::from)
    }
}

#[async_trait]
impl PvzRepository<PgConnection> for PgPvzRepository {
    async fn create(&self, conn: &mut PgConnection, pvz: &Pvz) -> Result<(), PvzRepositoryError> {
        sqlx::query("INSERT INTO pvz (id, city, registered_at) VALUES ($1, $2, $3)")
            .bind(pvz.id.as_uuid())
            .bind(pvz.city.as_str())
            .bind(pvz.registered_at)
            .execute(&mut *conn)
            .await
            .map_err(|e| PvzRepositoryError::Create(e.into()))?;

        Ok(())
    }

    async fn find_all(&self, conn: &mut PgConnection) -> Result<Vec<Pvz>, PvzRepositoryError> {
        let rows = sqlx::query("SELECT id, city, registered_at FROM pvz ORDER BY registered_at ASC")
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| PvzRepositoryError::FindAll(e.into()))?;

        Self::rows_to_pvzs(rows).map_err(PvzRepositoryError::FindAll)
    }

    async fn find_by_ids(
        &self,
        conn: &mut PgConnection,
        ids: &[PvzId],
    ) -> Result<Vec<Pvz>, PvzRepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(PvzId::as_uuid).collect();

        let rows = sqlx::query("SELECT id, city, registered_at FROM pvz WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| PvzRepositoryError::FindByIds(e.into()))?;

        Self::rows_to_pvzs(rows).map_err(PvzRepositoryError::FindByIds)
    }
}
