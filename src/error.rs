//! Error types and handling for the `presence-guard` library

use thiserror::Error;

/// Main error type for the `presence-guard` library
///
/// Rejected check-ins are not errors: they are reported through
/// [`crate::ValidationOutcome`]. This type covers inputs the caller should never
/// have produced and failures around sample collection.
#[derive(Error, Debug)]
pub enum PresenceGuardError {
    /// Malformed validator input (thresholds, target, or sample set)
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Configuration file or environment errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Collector used out of order
    #[error("Collection error: {message}")]
    Collection { message: String },

    /// Collection window elapsed before enough samples arrived
    #[error("Collection timed out after {collected} of {required} samples")]
    CollectionTimeout { collected: usize, required: usize },

    /// Sample feed ended before enough samples arrived
    #[error("Sample feed closed after {collected} of {required} samples")]
    FeedClosed { collected: usize, required: usize },

    /// JSON boundary errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PresenceGuardError {
    /// Create a new invalid configuration error
    pub fn invalid_configuration<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new collection error
    pub fn collection<S: Into<String>>(message: S) -> Self {
        Self::Collection {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PresenceGuardError::InvalidConfiguration { message } => {
                format!("Check-in request is malformed: {message}")
            }
            PresenceGuardError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            PresenceGuardError::Collection { .. } => {
                "Location collection is not running. Start a new check-in.".to_string()
            }
            PresenceGuardError::CollectionTimeout { .. } | PresenceGuardError::FeedClosed { .. } => {
                "Could not collect enough GPS readings. Move to an open area and try again."
                    .to_string()
            }
            PresenceGuardError::Serialization { .. } => {
                "Check-in payload could not be read.".to_string()
            }
            PresenceGuardError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
