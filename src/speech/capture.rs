//! Capture-session state machine.
//!
//! ```text
//! Idle ──ready──▶ Listening ──result──▶ Recognized
//!   │                 ├──────error────▶ Failed
//!   │                 └──────stop─────▶ Stopped
//!   ├──error (before ready)───────────▶ Failed
//!   └──stop───────────────────────────▶ Stopped
//! ```
//!
//! Partial results are ignored and terminal states absorb every later event.

use super::{SpeechErrorCode, SpeechEvent};

/// Where a capture session is.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    Listening,
    Recognized { text: String },
    Failed { code: SpeechErrorCode, message: String },
    Stopped,
}

impl CaptureState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Recognized { .. } | Self::Failed { .. } | Self::Stopped
        )
    }
}

/// A state change the caller must react to.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureTransition {
    Listening,
    Recognized(String),
    Failed { code: SpeechErrorCode, message: String },
    Stopped,
}

/// One listening session.
#[derive(Debug)]
pub struct CaptureSession {
    state: CaptureState,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Feed a recognizer event.
    pub fn handle(&mut self, event: SpeechEvent) -> Option<CaptureTransition> {
        if self.state.is_terminal() {
            tracing::trace!(?event, "capture event after terminal state ignored");
            return None;
        }
        match event {
            SpeechEvent::Ready => {
                if self.state == CaptureState::Listening {
                    return None;
                }
                self.state = CaptureState::Listening;
                Some(CaptureTransition::Listening)
            }
            SpeechEvent::Partial { .. } => None,
            SpeechEvent::Result { text, confidence } => {
                let text = text.trim().to_owned();
                if text.is_empty() {
                    return self.fail(SpeechErrorCode::NoMatch);
                }
                tracing::debug!(confidence, chars = text.chars().count(), "speech recognized");
                self.state = CaptureState::Recognized { text: text.clone() };
                Some(CaptureTransition::Recognized(text))
            }
            SpeechEvent::Error { code } => self.fail(code),
            SpeechEvent::Stopped => self.stop(),
        }
    }

    /// Fail the session with `code`.
    pub fn fail(&mut self, code: SpeechErrorCode) -> Option<CaptureTransition> {
        if self.state.is_terminal() {
            return None;
        }
        let message = code.message().to_owned();
        self.state = CaptureState::Failed {
            code,
            message: message.clone(),
        };
        Some(CaptureTransition::Failed { code, message })
    }

    /// End the session without a result (explicit stop or stream end).
    pub fn stop(&mut self) -> Option<CaptureTransition> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = CaptureState::Stopped;
        Some(CaptureTransition::Stopped)
    }
}
