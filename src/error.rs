//! Error types for the screenwise engine.

/// Top-level error type for the contextual-action engine.
///
/// Collaborator failures (AI backend, speech input) never surface here;
/// they are converted to [`ErrorKind`](crate::overlay::state::ErrorKind)
/// at the orchestrator and capture boundaries and become `Failed` states.
#[derive(Debug, thiserror::Error)]
pub enum ScreenwiseError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Credential storage error.
    #[error("credential error: {0}")]
    Credential(#[from] crate::credentials::CredentialError),

    /// Async runtime is missing or unusable.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Host bridge protocol error.
    #[error("host error: {0}")]
    Host(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScreenwiseError>;
