use crate::social::SocialError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors (missing credentials, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A fetch against the social graph failed or timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// The friend directory could not be loaded completely
    #[error("Friend directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// Not enough eligible casts to build a quiz
    #[error(
        "Not enough casts to build a quiz: found {eligible}, need {required}. Try again or pick different friends"
    )]
    InsufficientContent { eligible: usize, required: usize },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Configuration problems end the session; nothing else does
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_))
    }

    /// Check if the caller may simply try the same operation again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Transport(_)
                | AppError::DirectoryUnavailable(_)
                | AppError::InsufficientContent { .. }
        )
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::InsufficientContent { .. } => 422,
            AppError::Transport(_) => 502,
            AppError::DirectoryUnavailable(_) => 503,
            AppError::Config(_) => 500,
            _ => 500,
        }
    }
}

impl From<SocialError> for AppError {
    fn from(err: SocialError) -> Self {
        match err {
            SocialError::Config(msg) => AppError::Config(msg),
            other => AppError::Transport(other.to_string()),
        }
    }
}
