//! Speech input capability and the capture-session state machine.
//!
//! The recognizer itself is platform code. It is exposed to the engine as a
//! [`SpeechInputService`] that produces a stream of [`SpeechEvent`]s for one
//! listening session.

pub mod capture;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use serde::{Deserialize, Serialize};

pub use capture::{CaptureSession, CaptureState, CaptureTransition};

/// Recognizer error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechErrorCode {
    Network,
    NetworkTimeout,
    Audio,
    Server,
    Client,
    SpeechTimeout,
    NoMatch,
    RecognizerBusy,
    InsufficientPermissions,
    /// No recognizer on this device.
    Unavailable,
}

impl SpeechErrorCode {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Network => "Network error during speech recognition",
            Self::NetworkTimeout => "Speech recognition timed out on the network",
            Self::Audio => "Audio recording error",
            Self::Server => "Speech recognition server error",
            Self::Client => "Speech recognition client error",
            Self::SpeechTimeout => "No speech detected",
            Self::NoMatch => "Could not understand speech",
            Self::RecognizerBusy => "Speech recognizer is busy",
            Self::InsufficientPermissions => "Microphone permission not granted",
            Self::Unavailable => "Speech recognition is not available on this device",
        }
    }

    /// Whether the failure is about permissions rather than recognition.
    #[must_use]
    pub fn is_permission(self) -> bool {
        matches!(self, Self::InsufficientPermissions)
    }
}

/// One recognizer callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SpeechEvent {
    /// The recognizer is ready and capturing audio.
    Ready,
    /// Interim hypothesis. The engine ignores these.
    Partial { text: String },
    /// Final result.
    Result { text: String, confidence: f32 },
    Error { code: SpeechErrorCode },
    /// The recognizer ended without a result.
    Stopped,
}

/// Failure to start a listening session at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("speech input unavailable ({code:?}): {message}")]
pub struct SpeechError {
    pub code: SpeechErrorCode,
    pub message: String,
}

impl SpeechError {
    pub fn new(code: SpeechErrorCode) -> Self {
        Self {
            code,
            message: code.message().to_owned(),
        }
    }
}

/// Events from one listening session. Dropping it must release the
/// recognizer and any audio resources.
pub type SpeechEventStream = Pin<Box<dyn Stream<Item = SpeechEvent> + Send>>;

/// A speech-to-text recognizer.
#[async_trait]
pub trait SpeechInputService: Send + Sync {
    /// Start a listening session.
    ///
    /// # Errors
    ///
    /// Returns [`SpeechError`] when the recognizer is unavailable or the
    /// microphone permission is missing.
    async fn listen(&self, language: &str) -> Result<SpeechEventStream, SpeechError>;

    /// Ask the recognizer to stop the current session.
    fn stop(&self);
}
