//! Versioned command/event envelopes for the native host shell.
//!
//! One JSON object per line in each direction. Commands carry intents,
//! screen text, and recognizer callbacks; events carry state snapshots,
//! side effects, and recognizer start/stop requests.

use serde::{Deserialize, Serialize};

use crate::overlay::{SideEffect, UiState, UserIntent};
use crate::speech::SpeechEvent;

/// Contract version for host envelopes.
pub const EVENT_VERSION: u32 = 1;

/// Host -> engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    /// A user intent from the overlay UI.
    Intent { intent: UserIntent },
    /// The visible screen text changed.
    Context { text: String },
    /// A callback from the platform recognizer.
    Speech { event: SpeechEvent },
    /// Stop the bridge.
    Shutdown,
}

/// Engine -> host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Latest UI state.
    State { state: UiState },
    Effect { effect: SideEffect },
    /// The engine wants the platform recognizer started or stopped.
    Recognizer { control: RecognizerControl },
    /// A command line could not be handled.
    Error { message: String },
}

/// Recognizer lifecycle requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecognizerControl {
    Start { language: String },
    Stop,
}

/// A versioned command envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    #[serde(flatten)]
    pub command: HostCommand,
}

impl CommandEnvelope {
    #[must_use]
    pub fn new(command: HostCommand) -> Self {
        Self {
            v: EVENT_VERSION,
            command,
        }
    }

    /// Parse and validate one line.
    pub fn parse(line: &str) -> Result<Self, ContractError> {
        let envelope: Self = serde_json::from_str(line).map_err(|e| {
            ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                format!("failed to parse command envelope: {e}"),
            )
        })?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Validate envelope version.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != EVENT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, EVENT_VERSION
                ),
            ));
        }
        Ok(())
    }
}

/// A versioned, sequenced event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub seq: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

impl EventEnvelope {
    #[must_use]
    pub fn new(seq: u64, event: HostEvent) -> Self {
        Self {
            v: EVENT_VERSION,
            seq,
            event,
        }
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ContractError {}
