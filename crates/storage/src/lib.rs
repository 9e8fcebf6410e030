//! Persistence for pickup points, receptions, products and users.
//!
//! Repositories run against a connection handed out by a
//! [`ConnectionProvider`]. Two backends ship with the crate: PostgreSQL for
//! production and an in-memory store for tests and local runs.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod provider;
pub mod query;
pub mod repository;

pub use error::{
    DbError, ProductRepositoryError, PvzRepositoryError, ReceptionRepositoryError, Result,
    SearchError, SearchParamsError, StorageError, UserRepositoryError,
};
pub use memory::{
    MemoryConnection, MemoryProductRepository, MemoryProvider, MemoryPvzRepository,
    MemoryReceptionRepository, MemoryUserRepository,
};
pub use postgres::{
    PgProductRepository, PgPvzRepository, PgReceptionRepository, PgUserRepository,
    PostgresProvider,
};
pub use provider::{ConnectionProvider, RollbackProvider, UnitFuture};
pub use query::ProductSearch;
pub use repository::{PvzRepository, ProductRepository, ReceptionRepository, UserRepository};
