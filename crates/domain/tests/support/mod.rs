//! Shared fixtures for the domain integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use argon2::Params;
use async_trait::async_trait;
use common::{City, Pvz, PvzId, UserId, UserRole};
use domain::{
    AuthenticatedUser, PlainTokenCredentials, PvzService, ReceptionService, UserService,
};
use storage::{
    ConnectionProvider, MemoryProductRepository, MemoryProvider, MemoryPvzRepository,
    MemoryReceptionRepository, MemoryUserRepository, UnitFuture,
};

/// Provider decorator that counts units of work.
#[derive(Debug, Clone, Default)]
pub struct CountingProvider<P> {
    inner: P,
    calls: Arc<AtomicUsize>,
}

impl<P> CountingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: ConnectionProvider> ConnectionProvider for CountingProvider<P> {
    type Conn = P::Conn;

    async fn execute<T, F>(&self, unit: F) -> storage::Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(unit).await
    }

    async fn execute_tx<T, F>(&self, unit: F) -> storage::Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> UnitFuture<'c, T> + Send + 'static,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute_tx(unit).await
    }
}

pub type Provider = CountingProvider<MemoryProvider>;

pub type Lifecycle = ReceptionService<Provider, MemoryReceptionRepository, MemoryProductRepository>;

pub type Points = PvzService<
    Provider,
    MemoryPvzRepository,
    MemoryReceptionRepository,
    MemoryProductRepository,
>;

pub type Identity = UserService<Provider, MemoryUserRepository>;

pub fn provider() -> Provider {
    CountingProvider::new(MemoryProvider::new())
}

pub fn lifecycle(provider: &Provider) -> Lifecycle {
    ReceptionService::new(
        provider.clone(),
        MemoryReceptionRepository,
        MemoryProductRepository,
    )
}

pub fn points(provider: &Provider) -> Points {
    PvzService::new(
        provider.clone(),
        MemoryPvzRepository,
        MemoryReceptionRepository,
        MemoryProductRepository,
    )
}

/// Argon2 at minimum cost so tests stay fast.
pub fn credentials() -> Arc<PlainTokenCredentials> {
    Arc::new(PlainTokenCredentials::with_params(
        Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None).unwrap(),
    ))
}

pub fn identity(provider: &Provider) -> Identity {
    UserService::new(provider.clone(), MemoryUserRepository, credentials())
}

pub fn employee() -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::new(), UserRole::Employee)
}

pub fn moderator() -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::new(), UserRole::Moderator)
}

/// Registers a pickup point through the service and returns its id.
pub async fn registered_pvz(provider: &Provider, city: City) -> PvzId {
    use domain::Pvzs;

    let pvz: Pvz = points(provider)
        .create(Some(&moderator()), city)
        .await
        .unwrap();
    pvz.id
}
