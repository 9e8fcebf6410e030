use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use crate::{Result, StorageError};

/// Future returned by a unit of work borrowing a connection for `'c`.
pub type UnitFuture<'c, T> = BoxFuture<'c, Result<T>>;

/// Runs units of work against a live connection.
///
/// A unit is a closure receiving the provider's connection and returning a
/// boxed future. Units own everything they capture, so callers move cloned
/// repositories and values into them:
///
/// ```ignore
/// let repo = self.receptions.clone();
/// self.provider
///     .execute(move |conn| Box::pin(async move { Ok(repo.find_active(conn, pvz_id).await?) }))
///     .await
/// ```
#[async_trait]
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Connection handle passed to units and repositories.
    type Conn: Send;

    /// Runs a read-only unit. No atomicity is guaranteed across statements.
    ///
    /// Fails with [`StorageError::Connection`] if no connection can be acquired.
    async fn execute<T, F>(&self, unit: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static;

    /// Runs a unit inside a transaction.
    ///
    /// Commits only if the unit returns `Ok`. Any error rolls the transaction
    /// back and is returned unchanged.
    async fn execute_tx<T, F>(&self, unit: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static;
}

/// Test-isolation decorator that rolls back every unit, even successful ones.
///
/// Both methods run inside a transaction of the wrapped provider. After a
/// successful unit a [`StorageError::ForcedRollback`] is injected so the inner
/// provider discards the work; the sentinel is swallowed and the unit's value
/// is returned. A unit's own error propagates unchanged.
#[derive(Debug, Clone)]
pub struct RollbackProvider<P> {
    inner: P,
}

impl<P: ConnectionProvider> RollbackProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: ConnectionProvider> ConnectionProvider for RollbackProvider<P> {
    type Conn = P::Conn;

    async fn execute<T, F>(&self, unit: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static,
    {
        self.execute_tx(unit).await
    }

    async fn execute_tx<T, F>(&self, unit: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();

        let outcome = self
            .inner
            .execute_tx::<(), _>(move |conn| {
                Box::pin(async move {
                    let value = unit(conn).await?;
                    let _ = sender.send(value);
                    Err::<(), _>(StorageError::ForcedRollback)
                })
            })
            .await;

        match outcome {
            Ok(()) | Err(StorageError::ForcedRollback) => {
                receiver.await.map_err(|_| StorageError::ForcedRollback)
            }
            Err(err) => Err(err),
        }
    }
}
