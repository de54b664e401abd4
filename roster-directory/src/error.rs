//! Error types for roster-directory.

use thiserror::Error;

/// Service error code for "resource already exists".
pub const CODE_CONFLICT: u32 = 20001;
/// Service error code for "too many requests".
pub const CODE_RATE_LIMITED: u32 = 20429;

/// Every failure a directory call can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The worker already exists.
    #[error("conflict (code {code}): {message}")]
    Conflict { code: u32, message: String },

    /// The account's request rate was exceeded.
    #[error("rate limited (code {code}): {message}")]
    RateLimited { code: u32, message: String },

    /// Any other error response from the service.
    #[error("API error {status} (code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<u32>,
        message: String,
        more_info: Option<String>,
    },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// A success response whose body could not be decoded.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Three-way failure taxonomy used for logging and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Conflict,
    RateLimited,
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::RateLimited => write!(f, "rate limited"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl DirectoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::Conflict { .. } => ErrorKind::Conflict,
            DirectoryError::RateLimited { .. } => ErrorKind::RateLimited,
            DirectoryError::Api { .. }
            | DirectoryError::Transport(_)
            | DirectoryError::Decode(_) => ErrorKind::Unknown,
        }
    }

    /// Map an HTTP error status and the service's error body to a variant.
    /// The body code decides first; a bare 429 is still a rate limit.
    pub fn from_response(
        status: u16,
        code: Option<u32>,
        message: Option<String>,
        more_info: Option<String>,
    ) -> Self {
        let message = message.unwrap_or_else(|| format!("HTTP {status}"));
        match code {
            Some(CODE_CONFLICT) => DirectoryError::Conflict {
                code: CODE_CONFLICT,
                message,
            },
            Some(CODE_RATE_LIMITED) => DirectoryError::RateLimited {
                code: CODE_RATE_LIMITED,
                message,
            },
            _ if status == 429 => DirectoryError::RateLimited {
                code: code.unwrap_or(CODE_RATE_LIMITED),
                message,
            },
            _ => DirectoryError::Api {
                status,
                code,
                message,
                more_info,
            },
        }
    }
}
