//! Drives one speech capture session and reports it through an [`UpdateSink`].

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::effects::{HapticKind, SideEffect};
use super::orchestrator::UpdateSink;
use super::state::{ErrorKind, ResponseState, StateDelta};
use crate::speech::{CaptureSession, CaptureTransition, SpeechErrorCode, SpeechInputService};

/// Label shown while the microphone is open.
pub const LISTENING_LABEL: &str = "Listening...";

/// How a capture session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Trimmed, non-empty recognized text.
    Recognized(String),
    Failed(SpeechErrorCode),
    Stopped,
    Cancelled,
}

/// Speech failures map to permission or recognition errors.
#[must_use]
pub fn speech_error_kind(code: SpeechErrorCode) -> ErrorKind {
    if code.is_permission() {
        ErrorKind::PermissionError
    } else {
        ErrorKind::SpeechRecognitionError
    }
}

/// Run one listening session until it reaches a terminal state.
pub async fn run_capture(
    speech: &dyn SpeechInputService,
    language: &str,
    sink: &dyn UpdateSink,
    cancel: &CancellationToken,
) -> CaptureOutcome {
    let mut session = CaptureSession::new();

    let opened = tokio::select! {
        biased;
        () = cancel.cancelled() => return CaptureOutcome::Cancelled,
        result = speech.listen(language) => result,
    };
    let mut events = match opened {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "speech input could not start");
            return session
                .fail(e.code)
                .and_then(|transition| apply(transition, sink))
                .unwrap_or(CaptureOutcome::Failed(e.code));
        }
    };

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("capture cancelled");
                return CaptureOutcome::Cancelled;
            }
            event = events.next() => event,
        };
        let transition = match next {
            Some(event) => session.handle(event),
            None => session.stop(),
        };
        if let Some(transition) = transition
            && let Some(outcome) = apply(transition, sink)
        {
            return outcome;
        }
    }
}

/// Publish a transition. Returns the outcome once the session is terminal.
fn apply(transition: CaptureTransition, sink: &dyn UpdateSink) -> Option<CaptureOutcome> {
    match transition {
        CaptureTransition::Listening => {
            info!("listening for voice command");
            sink.state(StateDelta::Listening(true));
            sink.state(StateDelta::Response(ResponseState::Loading {
                label: LISTENING_LABEL.to_owned(),
            }));
            None
        }
        CaptureTransition::Recognized(text) => {
            sink.state(StateDelta::Listening(false));
            Some(CaptureOutcome::Recognized(text))
        }
        CaptureTransition::Failed { code, message } => {
            warn!(?code, %message, "speech capture failed");
            let kind = speech_error_kind(code);
            sink.state(StateDelta::Listening(false));
            sink.state(StateDelta::Response(ResponseState::Failed {
                message,
                kind,
                retryable: kind.is_retryable(),
            }));
            sink.effect(SideEffect::Haptic(HapticKind::Error));
            Some(CaptureOutcome::Failed(code))
        }
        CaptureTransition::Stopped => {
            debug!("capture stopped without a result");
            sink.state(StateDelta::Listening(false));
            sink.state(StateDelta::Response(ResponseState::Idle));
            Some(CaptureOutcome::Stopped)
        }
    }
}
