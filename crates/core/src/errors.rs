use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    /// A referenced column is absent in this deployment's schema. Raised at
    /// the persistence boundary so callers can retry with the column omitted.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A notification channel failed. Recovered locally by the workflow,
    /// never surfaced to the caller.
    #[error("Notification delivery error: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type BookingResult<T> = Result<T, BookingError>;
