use thiserror::Error;

/// Errors surfaced by the remote control plane or its transport.
///
/// The core performs no retries: a failed call fails the manifest for the
/// run and the next externally-triggered run re-attempts the full
/// reconcile. Timeouts are the transport's concern and surface here as
/// `Transport`.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Platform object not found: {kind}/{id}")]
    NotFound { kind: String, id: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode platform response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid platform base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

impl PlatformError {
    /// Creates a new `Api` error.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api { status, .. } if (400..500).contains(status) => ErrorCategory::Client,
            Self::Api { .. } => ErrorCategory::Server,
            Self::NotFound { .. } => ErrorCategory::Client,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Decode(_) | Self::BaseUrl(_) => ErrorCategory::Protocol,
        }
    }
}

/// Categories of platform errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Rejected by the remote API (4xx).
    Client,
    /// Remote-side failure (5xx).
    Server,
    /// Connection-level failure, including transport timeouts.
    Transport,
    /// Malformed request or response.
    Protocol,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Server => write!(f, "server"),
            Self::Transport => write!(f, "transport"),
            Self::Protocol => write!(f, "protocol"),
        }
    }
}

/// Convenience result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
