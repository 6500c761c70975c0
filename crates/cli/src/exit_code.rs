//! Exit code definitions for the bunstore CLI
//!
//! Scripts rely on these values; changing one is a breaking change.

use bunstore_core::{Error, StatusCode, StatusKind};

/// Exit codes for the bunstore CLI application.
///
/// Failed service statuses and local errors both land on this table so
/// automation can tell a missing object from a bad key or a dead network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error, including unexpected service statuses
    GeneralError = 1,

    /// User input error: invalid arguments, empty object name, bad config
    UsageError = 2,

    /// Network error: connection failure or timeout
    NetworkError = 3,

    /// The service rejected the access key or zone (401)
    AuthError = 4,

    /// Object, zone or profile not found
    NotFound = 5,

    /// Operation was interrupted (e.g., Ctrl+C)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    /// Exit code for a status returned by the storage service
    pub fn from_status(status: StatusCode) -> Self {
        match StatusKind::from(status) {
            StatusKind::Success => Self::Success,
            StatusKind::Unauthorized => Self::AuthError,
            StatusKind::NotFound => Self::NotFound,
            StatusKind::BadRequest => Self::UsageError,
            StatusKind::Other(_) => Self::GeneralError,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::NetworkError => "Network error",
            Self::AuthError => "Access key or storage zone rejected",
            Self::NotFound => "Resource not found",
            Self::Interrupted => "Operation interrupted",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
