//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Stored row violates a domain invariant
    #[error("invalid row data: {0}")]
    InvalidRow(String),
}

/// Result alias for database operations
pub type DbResult<T> = Result<T, DbError>;
