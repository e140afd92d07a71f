//! Voice capture through the store, with recognizer events pushed the way
//! the host bridge pushes them.

use screenwise::host::RecognizerControl;
use screenwise::overlay::store::MSG_VOICE_ACTIVE;
use screenwise::overlay::voice::LISTENING_LABEL;
use screenwise::overlay::{ErrorKind, HapticKind, ResponseState, SideEffect, UiState, UserIntent};
use screenwise::speech::{SpeechErrorCode, SpeechEvent};

use crate::helpers::Harness;

fn listening(state: &UiState) -> bool {
    state.listening
        && state.response
            == ResponseState::Loading {
                label: LISTENING_LABEL.into(),
            }
}

fn is_failed(state: &UiState) -> bool {
    matches!(state.response, ResponseState::Failed { .. })
}

async fn start_listening(h: &mut Harness) {
    h.store.dispatch(UserIntent::StartVoiceInput);
    h.recognizer_started().await;
    assert!(h.speech.push(SpeechEvent::Ready));
    h.wait_for(listening).await;
}

#[tokio::test]
async fn recognized_command_runs_against_current_context() {
    let mut h = Harness::new("text when capture started");
    start_listening(&mut h).await;

    h.context.set("text when speech ended");
    h.speech.push(SpeechEvent::Partial {
        text: "make it".into(),
    });
    h.speech.push(SpeechEvent::Result {
        text: "make it more formal".into(),
        confidence: 0.92,
    });

    let sub = h.next_submission().await;
    assert!(sub.prompt.contains("make it more formal"));
    assert_eq!(sub.context, "text when speech ended");

    let state = h
        .wait_for(|s| {
            s.response
                == ResponseState::Loading {
                    label: "Thinking...".into(),
                }
        })
        .await;
    assert!(!state.listening);
    assert!(!h.store.is_capturing());

    sub.send("Formal text.");
    sub.finish();
    let done = h
        .wait_for(|s| matches!(s.response, ResponseState::Succeeded { .. }))
        .await;
    assert!(matches!(
        done.response,
        ResponseState::Succeeded { ref action_label, .. } if action_label == "Voice Command"
    ));
}

#[tokio::test]
async fn network_error_after_ready_fails_capture() {
    let mut h = Harness::new("text");
    start_listening(&mut h).await;
    h.speech.push(SpeechEvent::Error {
        code: SpeechErrorCode::Network,
    });

    let state = h.wait_for(is_failed).await;
    assert!(!state.listening);
    assert!(matches!(
        state.response,
        ResponseState::Failed {
            kind: ErrorKind::SpeechRecognitionError,
            retryable: true,
            ..
        }
    ));
    h.settle().await;
    let errors = h
        .drain_effects()
        .into_iter()
        .filter(|e| *e == SideEffect::Haptic(HapticKind::Error))
        .count();
    assert_eq!(errors, 1);
    assert_eq!(h.ai.calls(), 0);
}

#[tokio::test]
async fn permission_error_before_ready_never_listens() {
    let mut h = Harness::new("text");
    let mut observed = h.store.subscribe_state();
    h.store.dispatch(UserIntent::StartVoiceInput);
    h.recognizer_started().await;
    h.speech.push(SpeechEvent::Error {
        code: SpeechErrorCode::InsufficientPermissions,
    });

    let state = h.wait_for(is_failed).await;
    assert!(matches!(
        state.response,
        ResponseState::Failed {
            kind: ErrorKind::PermissionError,
            ..
        }
    ));
    assert!(!observed.borrow_and_update().listening);
}

#[tokio::test]
async fn second_start_is_rejected_while_capturing() {
    let mut h = Harness::new("text");
    h.store.dispatch(UserIntent::StartVoiceInput);
    h.recognizer_started().await;

    h.store.dispatch(UserIntent::StartVoiceInput);
    assert_eq!(
        h.next_effect().await,
        SideEffect::ShowMessage(MSG_VOICE_ACTIVE.into())
    );
    assert!(h.store.is_capturing());
}

#[tokio::test]
async fn stop_resets_state_and_ignores_late_results() {
    let mut h = Harness::new("text");
    start_listening(&mut h).await;

    h.store.dispatch(UserIntent::StopVoiceInput);
    let state = h.store.current_state();
    assert!(!state.listening);
    assert!(state.response.is_idle());
    assert!(!h.store.is_capturing());

    let control = tokio::time::timeout(crate::helpers::WAIT, h.recognizer.recv())
        .await
        .unwrap();
    assert_eq!(control, Some(RecognizerControl::Stop));

    assert!(!h.speech.push(SpeechEvent::Result {
        text: "too late".into(),
        confidence: 1.0,
    }));
    h.settle().await;
    assert_eq!(h.ai.calls(), 0);
    assert_eq!(h.store.current_state(), state);
}

#[tokio::test]
async fn recognizer_stopping_on_its_own_returns_to_idle() {
    let mut h = Harness::new("text");
    start_listening(&mut h).await;
    h.speech.push(SpeechEvent::Stopped);

    let state = h
        .wait_for(|s| !s.listening && s.response.is_idle())
        .await;
    assert!(state.expanded);
    h.settle().await;
    assert!(!h.store.is_capturing());

    h.store.dispatch(UserIntent::StartVoiceInput);
    h.recognizer_started().await;
    assert!(h.store.is_capturing());
}

#[tokio::test]
async fn capture_does_not_cancel_the_running_action() {
    let mut h = Harness::new("text");
    h.store.dispatch(UserIntent::SummarizeScreen);
    let sub = h.next_submission().await;

    start_listening(&mut h).await;
    assert!(!sub.tx.is_closed());
    assert!(h.store.has_action_in_flight());
}

#[tokio::test]
async fn close_releases_the_recognizer() {
    let mut h = Harness::new("text");
    start_listening(&mut h).await;

    h.store.dispatch(UserIntent::CloseOverlay);
    let closed = h.store.current_state();
    assert!(!closed.listening);
    assert!(!h.store.is_capturing());
    let control = tokio::time::timeout(crate::helpers::WAIT, h.recognizer.recv())
        .await
        .unwrap();
    assert_eq!(control, Some(RecognizerControl::Stop));
    assert!(!h.speech.push(SpeechEvent::Result {
        text: "after close".into(),
        confidence: 1.0,
    }));

    h.drain_effects();
    h.store.dispatch(UserIntent::StartVoiceInput);
    h.recognizer_started().await;
    assert!(h.store.is_capturing());
    h.settle().await;
    assert!(
        !h.drain_effects()
            .contains(&SideEffect::ShowMessage(MSG_VOICE_ACTIVE.into()))
    );
    h.store.dispatch(UserIntent::StartVoiceInput);
    assert_eq!(
        h.next_effect().await,
        SideEffect::ShowMessage(MSG_VOICE_ACTIVE.into())
    );
    assert_eq!(h.ai.calls(), 0);
}
