//! Error types for the shared infrastructure

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Failure while talking to the ledger database
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not reach the database
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed to execute
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// The configuration could not be turned into connect options
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
