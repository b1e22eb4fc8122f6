use thiserror::Error;

/// Centralized error types for the application
///
/// Storage, Telegram and configuration failures are converted to this enum so
/// the service layer can propagate them with `?`. The HTTP layer maps it onto
/// status codes in [`crate::telegram::webapp::ApiError`].
///
/// # Example
///
/// ```no_run
/// use jobs_bot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Configuration could not be loaded or is incomplete
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external collaborator (invoice issuer, user directory) failed
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(Box::new(err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Anyhow(anyhow::anyhow!("blocking task failed: {}", err))
    }
}
