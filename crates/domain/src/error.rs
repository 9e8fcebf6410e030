//! Domain error types.
//!
//! Each service has its own error enum whose variants name the failing step.
//! Messages chain the step marker with the cause, e.g.
//! `reception service error: create failed: find active failed: ...`.

use storage::StorageError;
use thiserror::Error;

use crate::auth::AuthError;

/// Coarse category of a domain failure, used by adapters to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing caller or wrong role.
    Authorization,
    /// Malformed input: nil id, bad search parameters, bad email or token.
    Validation,
    /// Nothing to act on: no active reception, no product, no user.
    NotFound,
    /// Connection, query or constraint failure.
    Storage,
    /// Unknown email or wrong password at login.
    Credentials,
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The caller is anonymous or lacks the required role.
    #[error("empty or access denied error")]
    NotAuthorized,

    #[error("reception service error: {0}")]
    Reception(#[from] ReceptionError),

    #[error("products service error: {0}")]
    Product(#[from] ProductError),

    #[error("pvz service error: {0}")]
    Pvz(#[from] PvzError),

    #[error("user service error: {0}")]
    User(#[from] UserError),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotAuthorized => ErrorKind::Authorization,
            DomainError::Reception(ReceptionError::InvalidPvzId)
            | DomainError::Product(ProductError::InvalidPvzId) => ErrorKind::Validation,
            DomainError::Reception(
                ReceptionError::Create(e)
                | ReceptionError::CreateFindActive(e)
                | ReceptionError::CloseFindActive(e)
                | ReceptionError::Close(e),
            ) => storage_kind(e),
            DomainError::Product(
                ProductError::CreateFindActive(e)
                | ProductError::Create(e)
                | ProductError::DeleteFindActive(e)
                | ProductError::Delete(e),
            ) => storage_kind(e),
            DomainError::Pvz(
                PvzError::Create(e)
                | PvzError::FindAll(e)
                | PvzError::SearchProducts(e)
                | PvzError::SearchReceptions(e)
                | PvzError::SearchPvzs(e),
            ) => storage_kind(e),
            DomainError::User(err) => err.kind(),
        }
    }
}

fn storage_kind(err: &StorageError) -> ErrorKind {
    if err.is_invalid_params() {
        ErrorKind::Validation
    } else if err.is_not_found() {
        ErrorKind::NotFound
    } else {
        ErrorKind::Storage
    }
}

#[derive(Debug, Error)]
pub enum ReceptionError {
    #[error("invalid pvz id")]
    InvalidPvzId,

    #[error("create failed: {0}")]
    Create(#[source] StorageError),

    /// The reception was inserted but could not be read back.
    #[error("create failed: find active failed: {0}")]
    CreateFindActive(#[source] StorageError),

    #[error("close failed: find active failed: {0}")]
    CloseFindActive(#[source] StorageError),

    #[error("close failed: {0}")]
    Close(#[source] StorageError),
}

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("invalid pvz id")]
    InvalidPvzId,

    #[error("create product failed: find active failed: {0}")]
    CreateFindActive(#[source] StorageError),

    #[error("create product failed: {0}")]
    Create(#[source] StorageError),

    #[error("delete product failed: find active failed: {0}")]
    DeleteFindActive(#[source] StorageError),

    #[error("delete product failed: {0}")]
    Delete(#[source] StorageError),
}

#[derive(Debug, Error)]
pub enum PvzError {
    #[error("create pvz failed: {0}")]
    Create(#[source] StorageError),

    #[error("find all pvz failed: {0}")]
    FindAll(#[source] StorageError),

    #[error("search failed: search products failed: {0}")]
    SearchProducts(#[source] StorageError),

    #[error("search failed: search receptions failed: {0}")]
    SearchReceptions(#[source] StorageError),

    #[error("search failed: search pvzs failed: {0}")]
    SearchPvzs(#[source] StorageError),
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid email")]
    InvalidEmail,

    #[error("empty password")]
    EmptyPassword,

    #[error("create user failed: {0}")]
    Hash(#[source] AuthError),

    #[error("issue token failed: {0}")]
    IssueToken(#[source] AuthError),

    #[error("create user failed: {0}")]
    Create(#[source] StorageError),

    #[error("find token failed: {0}")]
    FindToken(#[source] StorageError),

    #[error("invalid password: {0}")]
    WrongPassword(#[source] AuthError),

    #[error("update token failed: {0}")]
    UpdateToken(#[source] StorageError),

    #[error("invalid token: {0}")]
    InvalidToken(#[source] AuthError),
}

impl UserError {
    fn kind(&self) -> ErrorKind {
        match self {
            UserError::InvalidEmail
            | UserError::EmptyPassword
            | UserError::Hash(_)
            | UserError::IssueToken(_)
            | UserError::InvalidToken(_) => ErrorKind::Validation,
            UserError::WrongPassword(_) => ErrorKind::Credentials,
            UserError::FindToken(e) if e.is_not_found() => ErrorKind::Credentials,
            UserError::Create(e) | UserError::FindToken(e) | UserError::UpdateToken(e) => {
                storage_kind(e)
            }
        }
    }
}
