//! Shared types for the pickup-point reception service.

pub mod model;
pub mod types;

pub use model::{
    City, NewReception, ParseEnumError, Product, ProductType, Pvz, PvzReceptions, Reception,
    ReceptionProducts, ReceptionStatus, User, UserRole,
};
pub use types::{ProductId, PvzId, ReceptionId, UserId};
