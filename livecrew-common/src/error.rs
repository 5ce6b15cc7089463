//! Common error types for LiveCrew

use thiserror::Error;

/// Common result type for LiveCrew operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across LiveCrew crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(db_err.message().to_string())
            }
            _ => Error::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_stays_database_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_display_includes_category() {
        let err = Error::NotFound("segment 7".to_string());
        assert_eq!(err.to_string(), "Not found: segment 7");

        let err = Error::Conflict("UNIQUE constraint failed".to_string());
        assert!(err.to_string().starts_with("Conflict:"));
    }
}
