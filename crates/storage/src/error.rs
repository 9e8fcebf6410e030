use thiserror::Error;

/// SQLSTATE raised on unique index violations.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE raised on foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Backend-neutral cause of a failed storage operation.
#[derive(Debug, Error)]
pub enum DbError {
    /// The statement matched no row.
    #[error("no rows in result set")]
    NotFound,

    /// A unique constraint rejected the write.
    #[error("unique constraint {0:?} violated")]
    UniqueViolation(String),

    /// A foreign key constraint rejected the write.
    #[error("foreign key constraint {0:?} violated")]
    ForeignKeyViolation(String),

    /// Any other driver-level failure (I/O, protocol, decoding, pool).
    #[error("{0}")]
    Driver(#[source] sqlx::Error),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let classified = match &err {
            sqlx::Error::RowNotFound => return DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                match db_err.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => Some(DbError::UniqueViolation(constraint)),
                    Some(FOREIGN_KEY_VIOLATION) => Some(DbError::ForeignKeyViolation(constraint)),
                    _ => None,
                }
            }
            _ => None,
        };
        classified.unwrap_or_else(|| DbError::Driver(err))
    }
}

/// Rejected product search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchParamsError {
    #[error("from must be less than to")]
    FromAfterTo,

    #[error("invalid page: {0}")]
    InvalidPage(i64),

    #[error("invalid limit: {0}")]
    InvalidLimit(i64),

    #[error("page without limit")]
    PageWithoutLimit,
}

/// Cause of a failed product search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Params(#[from] SearchParamsError),

    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Error)]
pub enum PvzRepositoryError {
    #[error("pvz repository error: create failed: {0}")]
    Create(#[source] DbError),

    #[error("pvz repository error: find all failed: {0}")]
    FindAll(#[source] DbError),

    #[error("pvz repository error: find by ids failed: {0}")]
    FindByIds(#[source] DbError),
}

#[derive(Debug, Error)]
pub enum ReceptionRepositoryError {
    #[error("receptions repository error: create failed: {0}")]
    Create(#[source] DbError),

    #[error("receptions repository error: find active failed: {0}")]
    FindActive(#[source] DbError),

    #[error("receptions repository error: close failed: {0}")]
    Close(#[source] DbError),

    #[error("receptions repository error: find by ids failed: {0}")]
    FindByIds(#[source] DbError),
}

#[derive(Debug, Error)]
pub enum ProductRepositoryError {
    #[error("products repository error: create failed: {0}")]
    Create(#[source] DbError),

    #[error("products repository error: delete failed: {0}")]
    DeleteLast(#[source] DbError),

    #[error("products repository error: search failed: {0}")]
    Search(#[source] SearchError),
}

impl From<SearchParamsError> for ProductRepositoryError {
    fn from(err: SearchParamsError) -> Self {
        ProductRepositoryError::Search(SearchError::Params(err))
    }
}

#[derive(Debug, Error)]
pub enum UserRepositoryError {
    #[error("users repository error: create failed: {0}")]
    Create(#[source] DbError),

    #[error("users repository error: read failed: {0}")]
    ReadByEmail(#[source] DbError),

    #[error("users repository error: update token by email failed: {0}")]
    UpdateTokenByEmail(#[source] DbError),
}

/// Error returned by a unit of work run through a connection provider.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Acquiring a connection, or beginning/committing a transaction, failed.
    #[error("connection failed: {0}")]
    Connection(#[source] DbError),

    #[error(transparent)]
    Pvz(#[from] PvzRepositoryError),

    #[error(transparent)]
    Reception(#[from] ReceptionRepositoryError),

    #[error(transparent)]
    Product(#[from] ProductRepositoryError),

    #[error(transparent)]
    User(#[from] UserRepositoryError),

    /// Sentinel injected by [`crate::RollbackProvider`]; never seen by its callers.
    #[error("transaction rolled back by the rollback provider")]
    ForcedRollback,
}

impl StorageError {
    /// Returns the backend cause, if the failure came from the database.
    pub fn db_error(&self) -> Option<&DbError> {
        match self {
            StorageError::Connection(e) => Some(e),
            StorageError::Pvz(
                PvzRepositoryError::Create(e)
                | PvzRepositoryError::FindAll(e)
                | PvzRepositoryError::FindByIds(e),
            ) => Some(e),
            StorageError::Reception(
                ReceptionRepositoryError::Create(e)
                | ReceptionRepositoryError::FindActive(e)
                | ReceptionRepositoryError::Close(e)
                | ReceptionRepositoryError::FindByIds(e),
            ) => Some(e),
            StorageError::Product(
                ProductRepositoryError::Create(e) | ProductRepositoryError::DeleteLast(e),
            ) => Some(e),
            StorageError::Product(ProductRepositoryError::Search(SearchError::Db(e))) => Some(e),
            StorageError::User(
                UserRepositoryError::Create(e)
                | UserRepositoryError::ReadByEmail(e)
                | UserRepositoryError::UpdateTokenByEmail(e),
            ) => Some(e),
            StorageError::Product(ProductRepositoryError::Search(SearchError::Params(_)))
            | StorageError::ForcedRollback => None,
        }
    }

    /// True when the operation found no row to act on.
    pub fn is_not_found(&self) -> bool {
        self.db_error().is_some_and(DbError::is_not_found)
    }

    /// True when the caller supplied invalid search parameters.
    pub fn is_invalid_params(&self) -> bool {
        matches!(
            self,
            StorageError::Product(ProductRepositoryError::Search(SearchError::Params(_)))
        )
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
