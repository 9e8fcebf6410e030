//! PostgreSQL-backed provider and repositories.

mod product;
mod pvz;
mod reception;
mod user;

use std::str::FromStr;

use async_trait::async_trait;
use common::ParseEnumError;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};

use crate::provider::{ConnectionProvider, UnitFuture};
use crate::{DbError, Result, StorageError};

pub use product::PgProductRepository;
pub use pvz::PgPvzRepository;
pub use reception::PgReceptionRepository;
pub use user::PgUserRepository;

/// Connection provider over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(connection_error)?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ConnectionProvider for PostgresProvider {
    type Conn = PgConnection;

    async fn execute<T, F>(&self, unit: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static,
    {
        let mut conn = self.pool.acquire().await.map_err(connection_error)?;
        unit(&mut *conn).await
    }

    async fn execute_tx<T, F>(&self, unit: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static,
    {
        let mut tx = self.pool.begin().await.map_err(connection_error)?;

        match unit(&mut *tx).await {
            Ok(value) => {
                tx.commit().await.map_err(connection_error)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }
}

fn connection_error(err: sqlx::Error) -> StorageError {
    StorageError::Connection(DbError::from(err))
}

/// Reads a text column into one of the shared enums.
fn decode_text<T>(row: &PgRow, column: &str) -> std::result::Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let text: String = row.try_get(column)?;
    text.parse().map_err(|e: ParseEnumError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
