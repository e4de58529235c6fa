//! Error types for the EventDev client.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur in EventDev operations.
#[derive(Error, Debug)]
pub enum EventDevError {
    /// No response was received (DNS, refused connection, dropped socket).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not signed in")]
    Unauthorized,

    #[error("Missing required role: {0}")]
    Forbidden(String),

    #[error("Wrong e-mail or password")]
    WrongCredentials,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EventDevError {
    /// HTTP status of the failed request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            EventDevError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, EventDevError::Connection(_))
    }
}

impl From<ValidationErrors> for EventDevError {
    fn from(errors: ValidationErrors) -> Self {
        EventDevError::Validation(errors)
    }
}

/// Result type alias for EventDev operations.
pub type EventDevResult<T> = Result<T, EventDevError>;
