//! Host bridge end-to-end over in-memory pipes.

use std::sync::Arc;

use screenwise::context::SharedContext;
use screenwise::host::{
    CommandEnvelope, EventEnvelope, HostBridge, HostCommand, HostEvent, HostSpeechInput,
    RecognizerControl, run_bridge,
};
use screenwise::overlay::{
    Collaborators, ErrorKind, OverlayStore, ResponseState, SideEffect, StoreOptions, UserIntent,
};
use screenwise::speech::{SpeechErrorCode, SpeechEvent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};

use crate::helpers::{ScriptedAi, WAIT};

struct Pipes {
    commands: DuplexStream,
    events: Lines<BufReader<DuplexStream>>,
}

impl Pipes {
    async fn send(&mut self, command: HostCommand) {
        let mut line = serde_json::to_string(&CommandEnvelope::new(command)).unwrap();
        line.push('\n');
        self.commands.write_all(line.as_bytes()).await.unwrap();
    }

    async fn send_raw(&mut self, line: &str) {
        self.commands.write_all(line.as_bytes()).await.unwrap();
        self.commands.write_all(b"\n").await.unwrap();
    }

    async fn next_event(&mut self) -> EventEnvelope {
        let line = tokio::time::timeout(WAIT, self.events.next_line())
            .await
            .expect("timed out waiting for event")
            .unwrap()
            .expect("event stream open");
        serde_json::from_str(&line).unwrap()
    }

    /// Skip events until one matches.
    async fn expect(&mut self, mut pred: impl FnMut(&HostEvent) -> bool) -> EventEnvelope {
        loop {
            let envelope = self.next_event().await;
            if pred(&envelope.event) {
                return envelope;
            }
        }
    }
}

fn start_bridge() -> (Pipes, tokio::task::JoinHandle<screenwise::Result<()>>) {
    let (ai, _submissions) = ScriptedAi::new();
    let context = SharedContext::new();
    let (speech, recognizer) = HostSpeechInput::new();
    let speech = Arc::new(speech);
    let store = OverlayStore::new(
        Collaborators {
            context: Arc::new(context.clone()),
            ai,
            speech: speech.clone(),
        },
        StoreOptions::default(),
    )
    .unwrap();

    let (commands, bridge_input) = tokio::io::duplex(16 * 1024);
    let (bridge_output, events) = tokio::io::duplex(256 * 1024);
    let bridge = HostBridge {
        store,
        context,
        speech,
    };
    let handle = tokio::spawn(run_bridge(
        bridge,
        recognizer,
        BufReader::new(bridge_input),
        bridge_output,
    ));
    (
        Pipes {
            commands,
            events: BufReader::new(events).lines(),
        },
        handle,
    )
}

#[tokio::test]
async fn initial_state_is_published() {
    let (mut pipes, _bridge) = start_bridge();
    let first = pipes.next_event().await;
    assert_eq!(first.seq, 0);
    match first.event {
        HostEvent::State { state } => {
            assert!(state.expanded);
            assert!(state.response.is_idle());
        }
        other => panic!("expected state, got {other:?}"),
    }
}

#[tokio::test]
async fn copy_intent_produces_effects() {
    let (mut pipes, _bridge) = start_bridge();
    pipes
        .send(HostCommand::Intent {
            intent: UserIntent::CopyToClipboard {
                text: "hello".into(),
            },
        })
        .await;
    let copy = pipes
        .expect(|e| matches!(e, HostEvent::Effect { .. }))
        .await;
    assert_eq!(
        copy.event,
        HostEvent::Effect {
            effect: SideEffect::CopyText("hello".into())
        }
    );
}

#[tokio::test]
async fn pushed_context_reaches_the_orchestrator() {
    let (mut pipes, _bridge) = start_bridge();
    pipes.send(HostCommand::Context { text: "   ".into() }).await;
    pipes
        .send(HostCommand::Intent {
            intent: UserIntent::SummarizeScreen,
        })
        .await;
    pipes
        .expect(|e| {
            matches!(
                e,
                HostEvent::State { state } if matches!(
                    state.response,
                    ResponseState::Failed { kind: ErrorKind::NoContextAvailable, .. }
                )
            )
        })
        .await;
}

#[tokio::test]
async fn voice_round_trip_through_the_host() {
    let (mut pipes, _bridge) = start_bridge();
    pipes
        .send(HostCommand::Intent {
            intent: UserIntent::StartVoiceInput,
        })
        .await;
    let start = pipes
        .expect(|e| matches!(e, HostEvent::Recognizer { .. }))
        .await;
    assert_eq!(
        start.event,
        HostEvent::Recognizer {
            control: RecognizerControl::Start {
                language: "en-US".into()
            }
        }
    );

    pipes
        .send(HostCommand::Speech {
            event: SpeechEvent::Error {
                code: SpeechErrorCode::InsufficientPermissions,
            },
        })
        .await;
    pipes
        .expect(|e| {
            matches!(
                e,
                HostEvent::State { state } if matches!(
                    state.response,
                    ResponseState::Failed { kind: ErrorKind::PermissionError, .. }
                )
            )
        })
        .await;
}

#[tokio::test]
async fn malformed_lines_are_reported_and_skipped() {
    let (mut pipes, bridge) = start_bridge();
    pipes.send_raw("{not json").await;
    pipes
        .expect(|e| matches!(e, HostEvent::Error { .. }))
        .await;

    pipes.send_raw(r#"{"v":2,"type":"shutdown"}"#).await;
    let err = pipes
        .expect(|e| matches!(e, HostEvent::Error { .. }))
        .await;
    match err.event {
        HostEvent::Error { message } => assert!(message.contains("version")),
        other => panic!("expected error, got {other:?}"),
    }

    pipes.send(HostCommand::Shutdown).await;
    let result = tokio::time::timeout(WAIT, bridge).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn closing_input_stops_the_bridge() {
    let (pipes, bridge) = start_bridge();
    drop(pipes);
    let result = tokio::time::timeout(WAIT, bridge).await.unwrap().unwrap();
    assert!(result.is_ok());
}
