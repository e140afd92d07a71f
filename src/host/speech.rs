//! Speech input driven by the host process.
//!
//! The platform recognizer lives on the host side of the bridge. `listen`
//! asks the host to start it and returns a stream the host feeds with
//! [`HostCommand::Speech`](super::contract::HostCommand::Speech) callbacks.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::contract::RecognizerControl;
use crate::speech::{SpeechError, SpeechEvent, SpeechEventStream, SpeechInputService};

/// Speech service whose events come from the host.
#[derive(Debug)]
pub struct HostSpeechInput {
    session: Mutex<Option<mpsc::UnboundedSender<SpeechEvent>>>,
    control: mpsc::UnboundedSender<RecognizerControl>,
}

impl HostSpeechInput {
    /// Create the service and the receiver of recognizer requests for the host.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RecognizerControl>) {
        let (control, control_rx) = mpsc::unbounded_channel();
        (
            Self {
                session: Mutex::new(None),
                control,
            },
            control_rx,
        )
    }

    fn session(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<SpeechEvent>>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forward a recognizer callback to the active session.
    ///
    /// Returns `false` when no session is listening.
    pub fn push(&self, event: SpeechEvent) -> bool {
        let mut session = self.session();
        let delivered = session.as_ref().is_some_and(|tx| tx.send(event).is_ok());
        if !delivered {
            tracing::debug!("speech event with no active session dropped");
            *session = None;
        }
        delivered
    }
}

#[async_trait]
impl SpeechInputService for HostSpeechInput {
    async fn listen(&self, language: &str) -> Result<SpeechEventStream, SpeechError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.session() = Some(tx);
        if self
            .control
            .send(RecognizerControl::Start {
                language: language.to_owned(),
            })
            .is_err()
        {
            tracing::warn!("host recognizer channel closed");
        }
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    fn stop(&self) {
        // Dropping the sender ends the session's stream.
        self.session().take();
        let _ = self.control.send(RecognizerControl::Stop);
    }
}
