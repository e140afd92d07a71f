//! Action orchestration: context read, request build, streamed submission.
//!
//! The orchestrator never touches the published state. Every change is
//! handed to an [`UpdateSink`], which belongs to the store and discards
//! updates from tasks that are no longer current.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::accumulator::ResponseAccumulator;
use super::action::{ActionKind, ActionRequest};
use super::effects::{HapticKind, SideEffect};
use super::state::{ErrorKind, ResponseState, StateDelta};
use crate::ai::{AiError, AiTextService};
use crate::context::ContextProvider;

/// Receives the updates produced by a background task.
pub trait UpdateSink: Send + Sync {
    /// False once the task has been superseded or detached.
    fn is_current(&self) -> bool;
    fn state(&self, delta: StateDelta);
    fn effect(&self, effect: SideEffect);
}

/// What to run.
#[derive(Debug, Clone)]
pub enum ActionSource {
    /// Read fresh context and build a new request.
    Fresh(ActionKind),
    /// Resubmit a request that failed earlier, context included.
    Retry(ActionRequest),
}

impl ActionSource {
    fn action(&self) -> &ActionKind {
        match self {
            Self::Fresh(action) => action,
            Self::Retry(request) => &request.action,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    Failed(ErrorKind),
    Cancelled,
}

/// Runs actions against the AI text service.
pub struct Orchestrator {
    context: Arc<dyn ContextProvider>,
    ai: Arc<dyn AiTextService>,
    last_failed: Mutex<Option<ActionRequest>>,
}

impl Orchestrator {
    pub fn new(context: Arc<dyn ContextProvider>, ai: Arc<dyn AiTextService>) -> Self {
        Self {
            context,
            ai,
            last_failed: Mutex::new(None),
        }
    }

    /// The most recent request that failed after submission.
    pub fn last_failed(&self) -> Option<ActionRequest> {
        self.failed_slot().clone()
    }

    fn failed_slot(&self) -> MutexGuard<'_, Option<ActionRequest>> {
        self.last_failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one action to completion or cancellation.
    ///
    /// `expanded` is the overlay state when the action was accepted.
    pub async fn run(
        &self,
        source: ActionSource,
        expanded: bool,
        sink: &dyn UpdateSink,
        cancel: &CancellationToken,
    ) -> ActionOutcome {
        if !expanded {
            sink.state(StateDelta::Expand);
        }
        sink.effect(SideEffect::Haptic(HapticKind::Light));
        sink.state(StateDelta::Response(ResponseState::Loading {
            label: source.action().loading_label().to_owned(),
        }));

        let request = match source {
            ActionSource::Fresh(action) => {
                let context = self.context.current_context();
                if context.trim().is_empty() {
                    info!(action = action.label(), "no readable context; action skipped");
                    return fail(sink, ErrorKind::NoContextAvailable);
                }
                ActionRequest::new(action, context)
            }
            ActionSource::Retry(request) => {
                info!(request_id = %request.id, "retrying failed request");
                request
            }
        };

        self.submit(request, sink, cancel).await
    }

    async fn submit(
        &self,
        request: ActionRequest,
        sink: &dyn UpdateSink,
        cancel: &CancellationToken,
    ) -> ActionOutcome {
        let label = request.action.label();
        info!(
            request_id = %request.id,
            action = label,
            backend = self.ai.name(),
            context_chars = request.context_snapshot.chars().count(),
            "submitting action"
        );

        let prompt = request.prompt();
        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => return cancelled(&request),
            result = self.ai.submit(&prompt, &request.context_snapshot) => result,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => return self.fail_request(request, &e, sink, cancel),
        };

        let mut accumulator = ResponseAccumulator::new();
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => return cancelled(&request),
                item = stream.next() => item,
            };
            match next {
                Some(Ok(increment)) => {
                    let snapshot = accumulator.push(&increment);
                    sink.state(StateDelta::Response(ResponseState::Streaming {
                        partial_text: snapshot,
                        action_label: label.to_owned(),
                    }));
                }
                Some(Err(e)) => return self.fail_request(request, &e, sink, cancel),
                None => break,
            }
        }

        if !accumulator.has_content() {
            let e = AiError::InvalidResponse("stream completed without text".into());
            return self.fail_request(request, &e, sink, cancel);
        }

        debug!(
            request_id = %request.id,
            increments = accumulator.increments(),
            "stream complete"
        );
        {
            let mut slot = self.failed_slot();
            if slot.as_ref().is_some_and(|failed| failed.id == request.id) {
                *slot = None;
            }
        }
        sink.state(StateDelta::Response(ResponseState::Succeeded {
            final_text: accumulator.finish(),
            action_label: label.to_owned(),
            completed_at: chrono::Utc::now(),
        }));
        sink.effect(SideEffect::Haptic(HapticKind::Success));
        info!(request_id = %request.id, "action succeeded");
        ActionOutcome::Succeeded
    }

    fn fail_request(
        &self,
        request: ActionRequest,
        error: &AiError,
        sink: &dyn UpdateSink,
        cancel: &CancellationToken,
    ) -> ActionOutcome {
        let kind = error.kind();
        warn!(request_id = %request.id, error = %error, ?kind, "action failed");
        if cancel.is_cancelled() || !sink.is_current() {
            debug!(request_id = %request.id, "stale failure not retained");
            return ActionOutcome::Cancelled;
        }
        *self.failed_slot() = Some(request);
        fail(sink, kind)
    }
}

fn fail(sink: &dyn UpdateSink, kind: ErrorKind) -> ActionOutcome {
    sink.state(StateDelta::Response(ResponseState::failed(kind)));
    sink.effect(SideEffect::Haptic(HapticKind::Error));
    ActionOutcome::Failed(kind)
}

fn cancelled(request: &ActionRequest) -> ActionOutcome {
    debug!(request_id = %request.id, "action cancelled");
    ActionOutcome::Cancelled
}
