//! Error types for bunstore-core
//!
//! HTTP statuses returned by the storage service are never errors; they are
//! handed back to the caller verbatim. This type covers everything that
//! prevents a status from being obtained or a body from being moved.

use thiserror::Error;

/// Result type alias for bunstore-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bunstore-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Object name rejected before any request was made
    #[error("Invalid object name: {0}")]
    InvalidName(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// IO error while reading a source or writing a sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connection, DNS or TLS failure before a status line was received
    #[error("Network error: {0}")]
    Network(String),

    /// The exchange did not finish within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// The upload source was already released
    #[error("Upload source has been released")]
    SourceReleased,
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidName(_) => 2,                             // UsageError
            Error::Config(_) | Error::InvalidUrl(_) => 2,           // UsageError
            Error::Network(_) | Error::Timeout(_) => 3,             // NetworkError
            Error::ProfileNotFound(_) => 5,                         // NotFound
            Error::Cancelled => 130,                                // Interrupted
            _ => 1,                                                 // GeneralError
        }
    }

    /// Whether this error is a caller-initiated cancellation
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
