//! Error types for the lost-and-found library.
//!
//! Every collaborator failure is funnelled into [`LostFoundError`]. The
//! view-state holders only ever render these to a message, so the variants
//! exist for logging and tests rather than for branching.

use thiserror::Error;

/// Errors that can occur in the lost-and-found application.
#[derive(Error, Debug)]
pub enum LostFoundError {
    /// Local store errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Local store connection pool errors
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The document database, auth service or blob storage rejected a call
    #[error("Backend error: {0}")]
    Backend(String),

    /// An ordered or filtered query needs a composite index the backend does not have
    #[error("Query requires an index: {0}")]
    IndexRequired(String),

    /// A stored document could not be decoded into its typed record
    #[error("Failed to decode document {id}: {source}")]
    Decode {
        /// Document id
        id: String,
        /// Underlying decode failure
        source: serde_json::Error,
    },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client-side input validation failed
    #[error("{message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// The signing-in account is outside the allow-listed email domain
    #[error("Only @{0} emails are allowed")]
    DomainNotAllowed(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl LostFoundError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Convenience type alias for Result with LostFoundError
pub type Result<T> = std::result::Result<T, LostFoundError>;

impl From<anyhow::Error> for LostFoundError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<config::ConfigError> for LostFoundError {
    fn from(err: config::ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_message_only() {
        let err = LostFoundError::validation("title", "Title is required");
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn domain_error_names_the_domain() {
        let err = LostFoundError::DomainNotAllowed("iiitdm.ac.in".to_string());
        assert_eq!(err.to_string(), "Only @iiitdm.ac.in emails are allowed");
    }
}
