//! Error types for the generative text backend.
//!
//! Each variant carries a stable error code (SCREAMING_SNAKE_CASE) that is
//! included in the Display output and accessible via [`AiError::code()`].

use crate::overlay::state::ErrorKind;

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Transport failure or unreachable backend.
    pub const NETWORK_FAILED: &str = "NETWORK_FAILED";

    /// Missing, invalid, or revoked API key.
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// Quota exhausted or request rate too high.
    pub const RATE_LIMITED: &str = "RATE_LIMITED";

    /// Backend answered with something unusable.
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";

    /// Provider-specific error not covered by other variants.
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
}

/// Errors produced by an [`AiTextService`](super::AiTextService).
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    /// Transport failure or unreachable backend.
    #[error("[{}] {}", error_codes::NETWORK_FAILED, .0)]
    NetworkError(String),

    /// Missing, invalid, or revoked API key.
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    AuthError(String),

    /// Quota exhausted or request rate too high.
    #[error("[{}] {}", error_codes::RATE_LIMITED, .0)]
    RateLimited(String),

    /// Backend answered with something unusable.
    #[error("[{}] {}", error_codes::INVALID_RESPONSE, .0)]
    InvalidResponse(String),

    /// Provider-specific error not covered by other variants.
    #[error("[{}] {}", error_codes::PROVIDER_ERROR, .0)]
    ProviderError(String),
}

impl AiError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NetworkError(_) => error_codes::NETWORK_FAILED,
            Self::AuthError(_) => error_codes::AUTH_FAILED,
            Self::RateLimited(_) => error_codes::RATE_LIMITED,
            Self::InvalidResponse(_) => error_codes::INVALID_RESPONSE,
            Self::ProviderError(_) => error_codes::PROVIDER_ERROR,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::NetworkError(m)
            | Self::AuthError(m)
            | Self::RateLimited(m)
            | Self::InvalidResponse(m)
            | Self::ProviderError(m) => m,
        }
    }

    /// The user-facing failure category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkError(_) => ErrorKind::NetworkError,
            Self::AuthError(_) => ErrorKind::AuthenticationError,
            Self::RateLimited(_) => ErrorKind::RateLimitError,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::ProviderError(_) => ErrorKind::UnknownError,
        }
    }

    /// Whether resubmitting the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
