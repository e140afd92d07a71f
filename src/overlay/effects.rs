//! One-shot notifications for the presentation layer.
//!
//! Effects are broadcast to current subscribers only. Nothing is retained,
//! so a subscriber that attaches late never sees earlier effects.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Haptic feedback flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticKind {
    Light,
    Success,
    Error,
}

/// A transient UI reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "value", rename_all = "snake_case")]
pub enum SideEffect {
    ShowMessage(String),
    Haptic(HapticKind),
    CopyText(String),
}

/// Fire-and-forget effect queue.
#[derive(Debug, Clone)]
pub struct EffectChannel {
    tx: broadcast::Sender<SideEffect>,
}

impl EffectChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Deliver to whoever is listening right now.
    pub fn emit(&self, effect: SideEffect) {
        if self.tx.send(effect).is_err() {
            tracing::trace!("side effect dropped; no subscribers");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SideEffect> {
        self.tx.subscribe()
    }
}
