//! Screenwise: on-demand AI actions over the text currently on screen.
//!
//! A user intent becomes a context snapshot, a streamed AI request, a
//! sequence of published UI states, and a handful of one-shot side effects.
//!
//! # Architecture
//!
//! - **Store** ([`overlay::OverlayStore`]): owns the single UI state, accepts
//!   intents without blocking, and enforces single-flight execution.
//! - **Orchestrator** ([`overlay::Orchestrator`]): reads context, submits to
//!   the AI backend, accumulates the stream, records failures for retry.
//! - **Speech capture** ([`speech`]): turns recognizer callbacks into a
//!   bounded capture-session state machine.
//! - **AI backend** ([`ai`]): the streaming text seam and its Gemini adapter.
//! - **Host bridge** ([`host`]): newline-delimited JSON over stdio for the
//!   native shell that renders the overlay.

pub mod ai;
pub mod app_dirs;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod host;
pub mod logging;
pub mod overlay;
pub mod speech;

pub use config::ScreenwiseConfig;
pub use error::{Result, ScreenwiseError};
pub use overlay::{OverlayStore, ResponseState, SideEffect, UiState, UserIntent};
