use thiserror::Error;

/// Errors raised at the store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error or driver failure.
    #[error("database error: {0}")]
    Db(String),
    /// The store refused the statement (constraint, injected fault, ...).
    #[error("statement rejected: {0}")]
    Rejected(String),
    /// The transaction was already finished.
    #[error("transaction closed")]
    Closed,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
