//! Error types for the insta-downloader application.

use std::fmt;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Content errors
    #[error("Invalid Instagram URL: {0}")]
    InvalidUrl(String),

    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Content is private: {0}")]
    PrivateContent(String),

    #[error("Download option unavailable: {0}")]
    OptionUnavailable(String),

    #[error("Instagram request failed ({reason}): {message}")]
    Upstream {
        reason: UpstreamReason,
        message: String,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an upstream request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamReason {
    /// No response within the configured timeout.
    Timeout,
    /// Instagram throttled the request.
    RateLimited { retry_after_secs: Option<u64> },
    /// Connection-level failure.
    Transport,
    /// The response could not be parsed.
    MalformedResponse,
    /// Unexpected HTTP status.
    Status(u16),
}

impl UpstreamReason {
    /// Stable identifier used in error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamReason::Timeout => "timeout",
            UpstreamReason::RateLimited { .. } => "rate_limited",
            UpstreamReason::Transport => "transport",
            UpstreamReason::MalformedResponse => "malformed_response",
            UpstreamReason::Status(_) => "status",
        }
    }
}

impl fmt::Display for UpstreamReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamReason::Status(code) => write!(f, "HTTP {}", code),
            UpstreamReason::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "rate limited, retry after {} seconds", secs),
            UpstreamReason::RateLimited { .. } => write!(f, "rate limited"),
            other => write!(f, "{}", other.as_str().replace('_', " ")),
        }
    }
}

/// Machine-checkable error kind surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    NotFound,
    PrivateContent,
    OptionUnavailable,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PrivateContent => "private_content",
            ErrorKind::OptionUnavailable => "option_unavailable",
            ErrorKind::Upstream => "upstream_error",
            ErrorKind::Internal => "internal",
        }
    }
}

impl Error {
    /// Shorthand for building an upstream error.
    pub fn upstream(reason: UpstreamReason, message: impl Into<String>) -> Self {
        Error::Upstream {
            reason,
            message: message.into(),
        }
    }

    /// Classify this error for callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl(_) | Error::UrlParse(_) => ErrorKind::InvalidUrl,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::PrivateContent(_) => ErrorKind::PrivateContent,
            Error::OptionUnavailable(_) => ErrorKind::OptionUnavailable,
            Error::Upstream { .. } | Error::Http(_) => ErrorKind::Upstream,
            _ => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Upstream
    }

    /// Upstream sub-reason, if this is an upstream failure.
    pub fn upstream_reason(&self) -> Option<UpstreamReason> {
        match self {
            Error::Upstream { reason, .. } => Some(*reason),
            Error::Http(e) if e.is_timeout() => Some(UpstreamReason::Timeout),
            Error::Http(e) if e.is_decode() => Some(UpstreamReason::MalformedResponse),
            Error::Http(_) => Some(UpstreamReason::Transport),
            _ => None,
        }
    }

    /// Human-readable message shown to end users.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidUrl(msg) => format!("Invalid Instagram URL: {}", msg),
            Error::UrlParse(e) => format!("Invalid Instagram URL: {}", e),
            Error::NotFound(msg) => format!(
                "Content not found: {}. It may have been removed or the link is wrong.",
                msg
            ),
            Error::PrivateContent(msg) => format!(
                "This content is private: {}. Only public accounts and posts can be downloaded.",
                msg
            ),
            Error::OptionUnavailable(msg) => format!(
                "{}. Analyze the URL again to get the current download options.",
                msg
            ),
            Error::Upstream {
                reason: UpstreamReason::RateLimited { .. },
                ..
            } => "Instagram is rate limiting requests. Please wait a moment and try again."
                .to_string(),
            Error::Upstream {
                reason: UpstreamReason::Timeout,
                ..
            } => "Instagram did not respond in time. Please try again.".to_string(),
            Error::Upstream { message, .. } => {
                format!("Could not reach Instagram: {}. Please try again.", message)
            }
            Error::Http(e) => format!("Could not reach Instagram: {}. Please try again.", e),
            _ => "Something went wrong".to_string(),
        }
    }
}

/// Process exit codes for the CLI.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const INVALID_INPUT: i32 = 2;
    pub const CONTENT_UNAVAILABLE: i32 = 3;
    pub const UPSTREAM_ERROR: i32 = 4;
    pub const CONFIG_ERROR: i32 = 5;
    pub const UNEXPECTED_ERROR: i32 = 6;
}
