//! The published UI state snapshot and its failure taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-facing failure categories.
///
/// Every collaborator error is converted to one of these before it reaches
/// the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkError,
    /// Bad or missing credential. The only non-retryable kind.
    AuthenticationError,
    RateLimitError,
    /// Empty or unexpected backend output.
    InvalidResponse,
    /// Nothing readable on screen.
    NoContextAvailable,
    SpeechRecognitionError,
    PermissionError,
    UnknownError,
}

impl ErrorKind {
    /// Whether the UI may offer a retry affordance.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::AuthenticationError)
    }

    /// Default human-readable message.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::NetworkError => "Network error. Check your connection and try again.",
            Self::AuthenticationError => "The API key is missing or invalid. Update it in settings.",
            Self::RateLimitError => "Too many requests. Wait a moment and try again.",
            Self::InvalidResponse => "The AI returned an empty or unexpected response.",
            Self::NoContextAvailable => "No readable text found on screen.",
            Self::SpeechRecognitionError => "Could not understand speech. Try again.",
            Self::PermissionError => "Microphone permission is required for voice commands.",
            Self::UnknownError => "Something went wrong. Try again.",
        }
    }
}

/// What the response panel shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseState {
    Idle,
    Loading {
        label: String,
    },
    Streaming {
        partial_text: String,
        action_label: String,
    },
    Succeeded {
        final_text: String,
        action_label: String,
        completed_at: DateTime<Utc>,
    },
    Failed {
        message: String,
        kind: ErrorKind,
        retryable: bool,
    },
}

impl ResponseState {
    /// A failure carrying the kind's default message and retry flag.
    #[must_use]
    pub fn failed(kind: ErrorKind) -> Self {
        Self::Failed {
            message: kind.user_message().to_owned(),
            kind,
            retryable: kind.is_retryable(),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Text currently on display, if any.
    #[must_use]
    pub fn visible_text(&self) -> Option<&str> {
        match self {
            Self::Streaming { partial_text, .. } => Some(partial_text),
            Self::Succeeded { final_text, .. } => Some(final_text),
            Self::Idle | Self::Loading { .. } | Self::Failed { .. } => None,
        }
    }
}

/// The single snapshot owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub expanded: bool,
    pub response: ResponseState,
    pub listening: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            expanded: true,
            response: ResponseState::Idle,
            listening: false,
        }
    }
}

impl UiState {
    /// Apply one task delta.
    pub fn apply(&mut self, delta: StateDelta) {
        match delta {
            StateDelta::Expand => self.expanded = true,
            StateDelta::Response(response) => self.response = response,
            StateDelta::Listening(listening) => self.listening = listening,
        }
    }
}

/// A change produced by a background task.
///
/// Tasks never touch [`UiState`] directly; they hand deltas to the store,
/// which applies them only while the task is still current.
#[derive(Debug, Clone, PartialEq)]
pub enum StateDelta {
    /// Force the overlay open.
    Expand,
    /// Replace the response panel.
    Response(ResponseState),
    Listening(bool),
}
