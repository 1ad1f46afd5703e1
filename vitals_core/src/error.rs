//! Error types for the vitals_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vitals_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input outside of its plausible range; nothing was changed
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The user database exists but could not be understood
    #[error("User database {path:?} is corrupt: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("Username '{0}' already exists")]
    DuplicateUser(String),

    #[error("Password must be at least {min_len} characters")]
    WeakPassword { min_len: usize },

    #[error("Username '{0}' not found")]
    UserNotFound(String),

    #[error("Incorrect password")]
    InvalidCredential,

    /// Password hashing backend failure
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl Error {
    /// Shorthand for building a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// True for authentication failures the caller should report, not abort on
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Error::DuplicateUser(_)
                | Error::WeakPassword { .. }
                | Error::UserNotFound(_)
                | Error::InvalidCredential
        )
    }
}
