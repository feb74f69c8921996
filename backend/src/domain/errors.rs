use thiserror::Error;

/// Errors produced by ledger, reminder and reporting operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Referenced subscription or billing instance does not exist
    #[error("{0}")]
    NotFound(String),
    /// Missing or invalid input, or a violated payment precondition
    #[error("{0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn not_found(message: impl Into<String>) -> Self {
        LedgerError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Internal(err.into())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
