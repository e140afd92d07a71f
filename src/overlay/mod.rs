//! The contextual-action engine: state store, orchestrator, and the types
//! they publish.

pub mod accumulator;
pub mod action;
pub mod effects;
pub mod intent;
pub mod orchestrator;
pub mod state;
pub mod store;
pub mod voice;

pub use accumulator::ResponseAccumulator;
pub use action::{ActionKind, ActionRequest};
pub use effects::{EffectChannel, HapticKind, SideEffect};
pub use intent::UserIntent;
pub use orchestrator::{ActionOutcome, ActionSource, Orchestrator, UpdateSink};
pub use state::{ErrorKind, ResponseState, StateDelta, UiState};
pub use store::{Collaborators, OverlayStore, StoreOptions};
pub use voice::CaptureOutcome;
