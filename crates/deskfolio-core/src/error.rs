//! Error types for Deskfolio

use thiserror::Error;

/// Result type alias using Deskfolio's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Deskfolio error types
///
/// The first five variants form the stable taxonomy surfaced to API callers;
/// the remaining variants are backend faults reported as `Internal`.
#[derive(Error, Debug)]
pub enum Error {
    // Caller errors
    #[error("{0}")]
    Validation(String),

    #[error("A project named '{0}' already exists")]
    Conflict(String),

    #[error("Project '{0}' not found")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Authentication failed")]
    AuthFailed,

    // Configuration errors (fatal at startup, never during a request)
    #[error("Configuration error: {0}")]
    Config(String),

    // Backend faults
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Remote storage error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable error code for this error, as reported in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation",
            Self::Conflict(_) => "Conflict",
            Self::NotFound(_) => "NotFound",
            Self::UploadFailed(_) => "UploadFailed",
            Self::AuthFailed => "AuthFailed",
            Self::Config(_)
            | Self::Database(_)
            | Self::Http(_)
            | Self::Serde(_)
            | Self::Io(_) => "Internal",
        }
    }

    /// Whether the error is the caller's fault rather than a backend fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Conflict(_)
                | Self::NotFound(_)
                | Self::AuthFailed
        )
    }
}
