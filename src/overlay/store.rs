//! The state store and intent dispatcher.
//!
//! [`OverlayStore`] owns the only [`UiState`]. Synchronous intents mutate it
//! inline; orchestrated intents spawn a task whose updates flow back through
//! a generation-checked sink. All mutations, generation bumps included,
//! happen under one lock, so a superseded task can never apply a delta after
//! its replacement has been started.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::action::{ActionKind, ActionRequest};
use super::effects::{EffectChannel, SideEffect};
use super::intent::UserIntent;
use super::orchestrator::{ActionSource, Orchestrator, UpdateSink};
use super::state::{ResponseState, StateDelta, UiState};
use super::voice::{CaptureOutcome, run_capture};
use crate::ai::AiTextService;
use crate::config::ScreenwiseConfig;
use crate::context::ContextProvider;
use crate::error::{Result, ScreenwiseError};
use crate::speech::SpeechInputService;

pub const MSG_COPIED: &str = "Copied to clipboard";
pub const MSG_NOTHING_TO_COPY: &str = "Nothing to copy";
pub const MSG_NO_RETRY: &str = "No action to retry";
pub const MSG_VOICE_ACTIVE: &str = "Voice input is already active";

/// The capabilities the engine is built from.
#[derive(Clone)]
pub struct Collaborators {
    pub context: Arc<dyn ContextProvider>,
    pub ai: Arc<dyn AiTextService>,
    pub speech: Arc<dyn SpeechInputService>,
}

/// Store tunables.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub start_expanded: bool,
    pub effect_capacity: usize,
    /// Recognizer language tag.
    pub language: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            start_expanded: true,
            effect_capacity: 64,
            language: "en-US".to_owned(),
        }
    }
}

impl From<&ScreenwiseConfig> for StoreOptions {
    fn from(config: &ScreenwiseConfig) -> Self {
        Self {
            start_expanded: config.store.start_expanded,
            effect_capacity: config.store.effect_capacity,
            language: config.speech.language.clone(),
        }
    }
}

/// Handle to the engine. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct OverlayStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<UiState>,
    effects: EffectChannel,
    control: Mutex<Control>,
    orchestrator: Arc<Orchestrator>,
    speech: Arc<dyn SpeechInputService>,
    language: String,
    runtime: Handle,
}

#[derive(Default)]
struct Control {
    action_generation: u64,
    capture_generation: u64,
    action: Option<TaskSlot>,
    capture: Option<TaskSlot>,
}

impl Control {
    fn generation(&self, lane: Lane) -> u64 {
        match lane {
            Lane::Action => self.action_generation,
            Lane::Capture => self.capture_generation,
        }
    }

    fn slot(&mut self, lane: Lane) -> &mut Option<TaskSlot> {
        match lane {
            Lane::Action => &mut self.action,
            Lane::Capture => &mut self.capture,
        }
    }

    /// Make the running action stale without cancelling it. The slot is
    /// kept so the next action still cancels it.
    fn detach_action(&mut self) {
        self.action_generation += 1;
    }

    fn current_action(&self) -> Option<&TaskSlot> {
        self.action
            .as_ref()
            .filter(|slot| slot.generation == self.action_generation)
    }
}

struct TaskSlot {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TaskSlot {
    fn cancel(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Action,
    Capture,
}

impl OverlayStore {
    /// Build a store on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenwiseError::Runtime`] outside a tokio runtime and
    /// [`ScreenwiseError::Config`] for a zero effect capacity.
    pub fn new(collaborators: Collaborators, options: StoreOptions) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| ScreenwiseError::Runtime(format!("no tokio runtime: {e}")))?;
        Self::with_runtime(collaborators, options, runtime)
    }

    /// Build a store that spawns its tasks on `runtime`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenwiseError::Config`] for a zero effect capacity.
    pub fn with_runtime(
        collaborators: Collaborators,
        options: StoreOptions,
        runtime: Handle,
    ) -> Result<Self> {
        if options.effect_capacity == 0 {
            return Err(ScreenwiseError::Config(
                "effect capacity must be greater than zero".into(),
            ));
        }
        let initial = UiState {
            expanded: options.start_expanded,
            ..UiState::default()
        };
        let (state, _) = watch::channel(initial);
        let orchestrator = Orchestrator::new(collaborators.context, collaborators.ai);
        Ok(Self {
            inner: Arc::new(StoreInner {
                state,
                effects: EffectChannel::new(options.effect_capacity),
                control: Mutex::new(Control::default()),
                orchestrator: Arc::new(orchestrator),
                speech: collaborators.speech,
                language: options.language,
                runtime,
            }),
        })
    }

    /// Accept an intent. Never blocks on in-flight work.
    pub fn dispatch(&self, intent: UserIntent) {
        debug!(?intent, "dispatch");
        if let Some(action) = intent.action() {
            self.inner.start_action(ActionSource::Fresh(action));
            return;
        }
        match intent {
            UserIntent::ToggleExpansion => self.inner.toggle_expansion(),
            UserIntent::CloseOverlay => self.inner.close(),
            UserIntent::CopyToClipboard { text } => self.inner.copy(text),
            UserIntent::StartVoiceInput => self.inner.start_capture(),
            UserIntent::StopVoiceInput => self.inner.stop_capture(),
            UserIntent::RetryLastAction => self.inner.retry(),
            UserIntent::SummarizeScreen
            | UserIntent::CheckGrammar
            | UserIntent::ChangeToneProfessional
            | UserIntent::ExplainSimply
            | UserIntent::ProcessVoiceCommand { .. } => {}
        }
    }

    /// Snapshot of the current state.
    pub fn current_state(&self) -> UiState {
        self.inner.state.borrow().clone()
    }

    /// Latest-value subscription. Intermediate snapshots may be coalesced.
    pub fn subscribe_state(&self) -> watch::Receiver<UiState> {
        self.inner.state.subscribe()
    }

    /// The state as a stream, starting with the current value.
    pub fn state_stream(&self) -> WatchStream<UiState> {
        WatchStream::new(self.subscribe_state())
    }

    /// Side effects emitted after this call. Nothing is replayed.
    pub fn subscribe_effects(&self) -> broadcast::Receiver<SideEffect> {
        self.inner.effects.subscribe()
    }

    /// The request [`UserIntent::RetryLastAction`] would resubmit.
    pub fn last_failed_request(&self) -> Option<ActionRequest> {
        self.inner.orchestrator.last_failed()
    }

    /// Whether an action whose updates are still published is running.
    pub fn has_action_in_flight(&self) -> bool {
        self.inner.control().current_action().is_some()
    }

    pub fn is_capturing(&self) -> bool {
        self.inner.control().capture.is_some()
    }
}

impl StoreInner {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the state, notifying subscribers only on change. Callers hold
    /// the control lock.
    fn update(&self, mutate: impl FnOnce(&mut UiState)) {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            mutate(state);
            *state != before
        });
    }

    fn toggle_expansion(&self) {
        let _control = self.control();
        self.update(|state| {
            if state.expanded {
                state.expanded = false;
                state.response = ResponseState::Idle;
            } else {
                state.expanded = true;
            }
        });
    }

    fn close(&self) {
        let mut control = self.control();
        control.detach_action();
        if self.end_capture(&mut control) {
            debug!("voice input ended by close");
        }
        self.update(|state| {
            state.expanded = false;
            state.response = ResponseState::Idle;
            state.listening = false;
        });
        info!("overlay closed");
    }

    fn copy(&self, text: String) {
        let _control = self.control();
        if text.trim().is_empty() {
            self.effects.emit(SideEffect::ShowMessage(MSG_NOTHING_TO_COPY.to_owned()));
            return;
        }
        self.effects.emit(SideEffect::CopyText(text));
        self.effects.emit(SideEffect::ShowMessage(MSG_COPIED.to_owned()));
    }

    fn retry(self: &Arc<Self>) {
        let mut control = self.control();
        match self.orchestrator.last_failed() {
            Some(request) => self.start_action_locked(&mut control, ActionSource::Retry(request)),
            None => {
                debug!("retry requested with no failed action");
                self.effects.emit(SideEffect::ShowMessage(MSG_NO_RETRY.to_owned()));
            }
        }
    }

    fn start_action(self: &Arc<Self>, source: ActionSource) {
        let mut control = self.control();
        self.start_action_locked(&mut control, source);
    }

    fn start_action_locked(self: &Arc<Self>, control: &mut Control, source: ActionSource) {
        control.action_generation += 1;
        let generation = control.action_generation;
        if let Some(previous) = control.action.take() {
            debug!(
                superseded = previous.generation,
                generation, "cancelling in-flight action"
            );
            previous.cancel();
        }

        let expanded = self.state.borrow().expanded;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let sink = TaskSink {
            store: Arc::downgrade(self),
            lane: Lane::Action,
            generation,
        };
        let orchestrator = Arc::clone(&self.orchestrator);
        let handle = self.runtime.spawn(async move {
            let outcome = orchestrator.run(source, expanded, &sink, &token).await;
            debug!(?outcome, generation, "action task finished");
            sink.release();
        });
        control.action = Some(TaskSlot {
            generation,
            cancel,
            handle,
        });
    }

    fn start_capture(self: &Arc<Self>) {
        let mut control = self.control();
        if control.capture.is_some() {
            debug!("voice input already active; start rejected");
            self.effects.emit(SideEffect::ShowMessage(MSG_VOICE_ACTIVE.to_owned()));
            return;
        }

        control.capture_generation += 1;
        let generation = control.capture_generation;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let sink = TaskSink {
            store: Arc::downgrade(self),
            lane: Lane::Capture,
            generation,
        };
        let speech = Arc::clone(&self.speech);
        let language = self.language.clone();
        let handle = self.runtime.spawn(async move {
            let outcome = run_capture(speech.as_ref(), &language, &sink, &token).await;
            debug!(?outcome, generation, "capture task finished");
            sink.finish_capture(outcome);
        });
        control.capture = Some(TaskSlot {
            generation,
            cancel,
            handle,
        });
    }

    /// Cancel the capture task and release the recognizer.
    fn end_capture(&self, control: &mut Control) -> bool {
        let Some(capture) = control.capture.take() else {
            return false;
        };
        control.capture_generation += 1;
        capture.cancel();
        self.speech.stop();
        true
    }

    fn stop_capture(&self) {
        let mut control = self.control();
        if !self.end_capture(&mut control) {
            debug!("stop requested with no active capture");
            return;
        }
        self.update(|state| {
            state.listening = false;
            state.response = ResponseState::Idle;
        });
        info!("voice input stopped");
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let control = self
            .control
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(action) = control.action.take() {
            action.cancel();
        }
        if let Some(capture) = control.capture.take() {
            capture.cancel();
            self.speech.stop();
        }
    }
}

/// Update path for one spawned task.
struct TaskSink {
    store: Weak<StoreInner>,
    lane: Lane,
    generation: u64,
}

impl TaskSink {
    /// Run `f` under the control lock if this task is still current.
    fn with_current(&self, f: impl FnOnce(&Arc<StoreInner>, &mut Control)) -> bool {
        let Some(store) = self.store.upgrade() else {
            return false;
        };
        let mut control = store.control();
        if control.generation(self.lane) != self.generation {
            trace!(lane = ?self.lane, generation = self.generation, "stale update dropped");
            return false;
        }
        f(&store, &mut control);
        true
    }

    /// Clear this task's slot once it has finished, detached or not.
    fn release(&self) {
        let Some(store) = self.store.upgrade() else {
            return;
        };
        let mut control = store.control();
        let slot = control.slot(self.lane);
        if slot.as_ref().is_some_and(|s| s.generation == self.generation) {
            *slot = None;
        }
    }

    fn finish_capture(&self, outcome: CaptureOutcome) {
        self.with_current(|store, control| {
            control.capture = None;
            if let CaptureOutcome::Recognized(command) = outcome {
                info!(chars = command.chars().count(), "voice command recognized");
                let action = ActionKind::VoiceCommand { command };
                store.start_action_locked(control, ActionSource::Fresh(action));
            }
        });
    }
}

impl UpdateSink for TaskSink {
    fn is_current(&self) -> bool {
        self.with_current(|_, _| {})
    }

    fn state(&self, delta: StateDelta) {
        self.with_current(|store, _| store.update(|state| state.apply(delta)));
    }

    fn effect(&self, effect: SideEffect) {
        self.with_current(|store, _| store.effects.emit(effect));
    }
}
