//! Shared application state.

use std::sync::Arc;

use domain::{
    Credentials, PvzService, Pvzs, ReceptionService, Receptions, UserService, Users,
};
use storage::{
    ConnectionProvider, MemoryProductRepository, MemoryProvider, MemoryPvzRepository,
    MemoryReceptionRepository, MemoryUserRepository, PgProductRepository, PgPvzRepository,
    PgReceptionRepository, PgUserRepository, PostgresProvider, ProductRepository, PvzRepository,
    ReceptionRepository, UserRepository,
};

/// Services shared by all handlers, behind object-safe traits so handlers
/// stay independent of the storage backend.
#[derive(Clone)]
pub struct AppState {
    pub pvzs: Arc<dyn Pvzs>,
    pub receptions: Arc<dyn Receptions>,
    pub users: Arc<dyn Users>,
}

impl AppState {
    /// Wires the services over one provider and its repositories.
    pub fn new<P, V, R, D, U>(
        provider: P,
        pvzs: V,
        receptions: R,
        products: D,
        users: U,
        credentials: Arc<dyn Credentials>,
    ) -> Self
    where
        P: ConnectionProvider + Clone,
        V: PvzRepository<P::Conn>,
        R: ReceptionRepository<P::Conn>,
        D: ProductRepository<P::Conn>,
        U: UserRepository<P::Conn>,
    {
        Self {
            pvzs: Arc::new(PvzService::new(
                provider.clone(),
                pvzs,
                receptions.clone(),
                products.clone(),
            )),
            receptions: Arc::new(ReceptionService::new(
                provider.clone(),
                receptions,
                products,
            )),
            users: Arc::new(UserService::new(provider, users, credentials)),
        }
    }

    pub fn postgres(provider: PostgresProvider, credentials: Arc<dyn Credentials>) -> Self {
        Self::new(
            provider,
            PgPvzRepository::new(),
            PgReceptionRepository::new(),
            PgProductRepository::new(),
            PgUserRepository::new(),
            credentials,
        )
    }

    pub fn in_memory(provider: MemoryProvider, credentials: Arc<dyn Credentials>) -> Self {
        Self::new(
            provider,
            MemoryPvzRepository,
            MemoryReceptionRepository,
            MemoryProductRepository,
            MemoryUserRepository,
            credentials,
        )
    }
}
