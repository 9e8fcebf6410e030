//! Domain layer for the pickup-point reception service.
//!
//! This crate provides:
//! - the reception/product lifecycle ([`ReceptionService`])
//! - pickup point registration and the nested listing search ([`PvzService`])
//! - registration, login and token authentication ([`UserService`])
//!
//! Services are generic over a [`storage::ConnectionProvider`] and its
//! repositories; adapters consume them through the object-safe
//! [`Receptions`], [`Pvzs`] and [`Users`] traits.

pub mod auth;
pub mod error;
pub mod pvz;
pub mod reception;
pub mod user;

pub use auth::{AuthError, AuthenticatedUser, Credentials, PlainTokenCredentials};
pub use error::{DomainError, ErrorKind, ProductError, PvzError, ReceptionError, UserError};
pub use pvz::{PvzService, Pvzs, assemble};
pub use reception::{ReceptionService, Receptions};
pub use user::{UserService, Users};
